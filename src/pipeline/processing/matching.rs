use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::domain::{quantity_text, MatchedItem, NormalizedItem};

pub const SIGNATURE_SEPARATOR: &str = "|";

/// Exact-match key: cleaned name, brand, standardized quantity and unit.
pub fn match_signature(item: &NormalizedItem) -> String {
    [
        item.name.trim().to_lowercase(),
        item.brand.as_deref().unwrap_or("").trim().to_lowercase(),
        quantity_text::format_opt(item.standardized_quantity),
        item.standardized_unit.trim().to_lowercase(),
    ]
    .join(SIGNATURE_SEPARATOR)
}

/// Summary of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub rows: usize,
    pub distinct_signatures: usize,
    pub distinct_ids: usize,
    /// Signature groups that had to take a fresh id because their
    /// provisional id already belonged to another group
    pub split_groups: usize,
}

impl MatchReport {
    /// Every signature owns exactly one id
    pub fn is_consistent(&self) -> bool {
        self.distinct_ids == self.distinct_signatures
    }
}

/// Assigns one final id per signature group.
///
/// A group takes the id of its first row. When that id was already taken by
/// an earlier group (two products that shared a name but differ in brand or
/// size), the group gets a fresh id above every id in the input instead.
/// Such split groups never carry their first row's provisional id; one id
/// per signature takes precedence.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    assigned: HashMap<String, u64>,
    claimed: HashSet<u64>,
    next_fresh: u64,
    split_groups: usize,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_for(&mut self, signature: String, provisional: u64) -> u64 {
        if let Some(id) = self.assigned.get(&signature) {
            return *id;
        }

        let id = if self.claimed.insert(provisional) {
            provisional
        } else {
            let fresh = self.next_fresh;
            self.next_fresh += 1;
            self.claimed.insert(fresh);
            self.split_groups += 1;
            warn!(provisional, fresh, signature = %signature, "provisional id shared by distinct products, splitting");
            fresh
        };
        self.assigned.insert(signature, id);
        id
    }

    /// Rewrite every row's id to its group id, keeping row order and all
    /// other fields.
    pub fn resolve(mut self, items: Vec<NormalizedItem>) -> (Vec<MatchedItem>, MatchReport) {
        self.next_fresh = items.iter().map(|i| i.id).max().map_or(1, |max| max + 1);

        let rows = items.len();
        let mut matched = Vec::with_capacity(rows);
        for mut item in items {
            let signature = match_signature(&item);
            item.id = self.id_for(signature, item.id);
            matched.push(item);
        }

        let distinct_ids = matched.iter().map(|i| i.id).collect::<HashSet<_>>().len();
        let report = MatchReport {
            rows,
            distinct_signatures: self.assigned.len(),
            distinct_ids,
            split_groups: self.split_groups,
        };

        if report.is_consistent() {
            info!(
                rows,
                groups = report.distinct_signatures,
                split_groups = report.split_groups,
                "identity resolution complete"
            );
        } else {
            warn!(
                distinct_ids = report.distinct_ids,
                distinct_signatures = report.distinct_signatures,
                "distinct ids do not match distinct signatures"
            );
        }

        (matched, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;

    fn item(id: u64, name: &str, store: &str, quantity: Option<f64>, unit: &str) -> NormalizedItem {
        NormalizedItem {
            id,
            name: name.to_string(),
            price: Price::from_cents(100),
            store: store.to_string(),
            brand: None,
            net_quantity: None,
            unit_of_measure: None,
            category: None,
            standardized_quantity: quantity,
            standardized_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_signature_format() {
        let mut row = item(1, "mlijeko 1l", "spar", Some(1000.0), "ml");
        assert_eq!(match_signature(&row), "mlijeko 1l||1000.0|ml");
        row.brand = Some("Dukat".to_string());
        row.standardized_quantity = None;
        row.standardized_unit = String::new();
        assert_eq!(match_signature(&row), "mlijeko 1l|dukat||");
    }

    #[test]
    fn test_rows_with_same_signature_share_first_id() {
        let rows = vec![
            item(4, "sir", "lidl", Some(500.0), "g"),
            item(9, "sir", "spar", Some(500.0), "g"),
            item(2, "kruh", "spar", None, ""),
        ];

        let (matched, report) = IdentityResolver::new().resolve(rows);
        assert_eq!(matched[0].id, 4);
        assert_eq!(matched[1].id, 4);
        assert_eq!(matched[2].id, 2);
        assert_eq!(matched[1].store, "spar");
        assert!(report.is_consistent());
        assert_eq!(report.split_groups, 0);
    }

    #[test]
    fn test_shared_provisional_id_is_split() {
        // same name, different sizes: provisional id 3 for both
        let rows = vec![
            item(3, "sok", "konzum", Some(1000.0), "ml"),
            item(3, "sok", "lidl", Some(200.0), "ml"),
            item(5, "voda", "lidl", None, ""),
            item(3, "sok", "spar", Some(200.0), "ml"),
        ];

        let (matched, report) = IdentityResolver::new().resolve(rows);
        assert_eq!(matched[0].id, 3);
        assert_eq!(matched[1].id, 6);
        assert_eq!(matched[2].id, 5);
        assert_eq!(matched[3].id, 6);
        assert_eq!(report.split_groups, 1);
        assert_eq!(report.distinct_ids, 3);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_empty_input() {
        let (matched, report) = IdentityResolver::new().resolve(Vec::new());
        assert!(matched.is_empty());
        assert_eq!(report, MatchReport::default());
    }
}
