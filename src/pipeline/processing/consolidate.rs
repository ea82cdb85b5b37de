use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{StoreProfile, StoreProfiles};
use crate::domain::{ConsolidatedItem, Price, RawRecord};
use crate::pipeline::ingestion::{parse_price, SourceReader};

/// Hands out provisional product ids keyed by normalized product name.
///
/// Ids start at 1 and follow first-seen order, so the same input order
/// always yields the same ids.
#[derive(Debug, Clone)]
pub struct ProvisionalIds {
    ids: HashMap<String, u64>,
    next_id: u64,
}

impl Default for ProvisionalIds {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisionalIds {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Lowercased with whitespace runs collapsed to one space
    pub fn key(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    pub fn id_for(&mut self, name: &str) -> u64 {
        let key = Self::key(name);
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(key, id);
        id
    }

    /// Number of distinct names seen so far
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// What happened to one store during consolidation
#[derive(Debug, Clone, PartialEq)]
pub enum StoreStatus {
    Read {
        encoding: &'static str,
        rows_read: usize,
        rows_kept: usize,
        rows_dropped: usize,
    },
    /// The whole store was skipped; carries the error kind
    Skipped(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreReport {
    pub store: String,
    pub status: StoreStatus,
}

/// Result of consolidating every configured store
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    /// Sorted and free of exact duplicates
    pub items: Vec<ConsolidatedItem>,
    pub stores: Vec<StoreReport>,
    pub distinct_names: usize,
    /// Rows dropped for empty names or bad prices, plus short rows
    pub rows_dropped: usize,
    /// Exact duplicates removed after merging
    pub duplicates_removed: usize,
}

/// Merges every store export into one table of uniformly shaped rows
pub struct Consolidator<'a> {
    profiles: &'a StoreProfiles,
}

impl<'a> Consolidator<'a> {
    pub fn new(profiles: &'a StoreProfiles) -> Self {
        Self { profiles }
    }

    /// Read each store in configured order from `data_dir`. A store that
    /// cannot be read is logged and skipped; it never aborts the run.
    pub fn consolidate(&self, data_dir: &Path) -> Consolidation {
        let mut ids = ProvisionalIds::new();
        let mut consolidation = Consolidation::default();
        let mut items = Vec::new();

        for profile in self.profiles.iter() {
            let path = profile.path_in(data_dir);
            let read = match SourceReader::new(profile).read(&path) {
                Ok(read) => read,
                Err(e) => {
                    warn!(store = %profile.store, error = %e, "skipping store");
                    consolidation.stores.push(StoreReport {
                        store: profile.store.clone(),
                        status: StoreStatus::Skipped(e.kind()),
                    });
                    continue;
                }
            };

            let rows_read = read.records.len() + read.rows_skipped;
            let (kept, dropped) = consolidate_records(&mut ids, profile, read.records);
            let rows_dropped = dropped + read.rows_skipped;
            info!(
                store = %profile.store,
                encoding = read.encoding,
                rows_read,
                rows_kept = kept.len(),
                rows_dropped,
                "store consolidated"
            );

            consolidation.rows_dropped += rows_dropped;
            consolidation.stores.push(StoreReport {
                store: profile.store.clone(),
                status: StoreStatus::Read {
                    encoding: read.encoding,
                    rows_read,
                    rows_kept: kept.len(),
                    rows_dropped,
                },
            });
            items.extend(kept);
        }

        let merged = items.len();
        items.sort();
        items.dedup();

        consolidation.duplicates_removed = merged - items.len();
        consolidation.distinct_names = ids.len();
        consolidation.items = items;
        consolidation
    }
}

/// Turn one store's raw records into consolidated rows, returning the kept
/// rows and the number dropped.
pub fn consolidate_records(
    ids: &mut ProvisionalIds,
    profile: &StoreProfile,
    records: Vec<RawRecord>,
) -> (Vec<ConsolidatedItem>, usize) {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for record in records {
        let name = record.name.trim();
        if name.is_empty() || record.store.trim().is_empty() {
            dropped += 1;
            continue;
        }

        let price = match parse_price(&record.price, profile.decimal_separator)
            .ok()
            .and_then(Price::from_value)
        {
            Some(price) => price,
            None => {
                debug!(store = %record.store, name, raw_price = %record.price, "unusable price, dropping row");
                dropped += 1;
                continue;
            }
        };

        kept.push(ConsolidatedItem {
            id: ids.id_for(name),
            name: name.to_string(),
            price,
            store: record.store.clone(),
            brand: record.brand,
            net_quantity: record.net_quantity,
            unit_of_measure: record.unit_of_measure,
            category: record.category,
        });
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMap;
    use crate::domain::DecimalSeparator;
    use std::fs;
    use tempfile::TempDir;

    fn profile(store: &str, delimiter: char, separator: DecimalSeparator) -> StoreProfile {
        StoreProfile::builtin(store, ColumnMap::new(0, 1), delimiter, &["utf-8"], separator, None)
    }

    fn raw(store: &str, name: &str, price: &str) -> RawRecord {
        RawRecord {
            store: store.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            brand: None,
            net_quantity: None,
            unit_of_measure: None,
            category: None,
        }
    }

    #[test]
    fn test_provisional_ids_follow_first_seen_order() {
        let mut ids = ProvisionalIds::new();
        assert_eq!(ids.id_for("Mlijeko 1L"), 1);
        assert_eq!(ids.id_for("Kruh"), 2);
        assert_eq!(ids.id_for("  MLIJEKO   1l "), 1);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_bad_rows_are_dropped() {
        let p = profile("konzum", ',', DecimalSeparator::Period);
        let mut ids = ProvisionalIds::new();
        let records = vec![
            raw("konzum", "Sir", "9.99"),
            raw("konzum", "  ", "1.00"),
            raw("konzum", "Jaja", "n/a"),
            raw("konzum", "Voda", "-0.50"),
        ];

        let (kept, dropped) = consolidate_records(&mut ids, &p, records);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 3);
        assert_eq!(kept[0].price, Price::from_cents(999));
        // dropped rows never consume an id
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_three_decimal_prices_round_like_two_decimal_text() {
        let p = profile("spar", ',', DecimalSeparator::Period);
        let mut ids = ProvisionalIds::new();
        let records = vec![
            raw("spar", "A", "0.125"),
            raw("spar", "B", "1.115"),
            raw("spar", "C", "99999999999999999999999"),
        ];

        let (kept, dropped) = consolidate_records(&mut ids, &p, records);
        let prices: Vec<_> = kept.iter().map(|i| i.price.to_string()).collect();
        assert_eq!(prices, vec!["0.12", "1.11"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_rows_sort_by_numeric_price_within_a_product() {
        let p = profile("spar", ',', DecimalSeparator::Period);
        let mut ids = ProvisionalIds::new();
        let (mut kept, _) = consolidate_records(
            &mut ids,
            &p,
            vec![raw("spar", "Sir", "10.00"), raw("spar", "Sir", "9.99")],
        );
        kept.sort();
        let prices: Vec<_> = kept.iter().map(|i| i.price.to_string()).collect();
        assert_eq!(prices, vec!["9.99", "10.00"]);
    }

    #[test]
    fn test_consolidates_stores_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tommy.csv"), "naziv;cijena\nMlijeko 1L;6,99\nKruh;1,20\n").unwrap();
        fs::write(dir.path().join("spar.csv"), "name,price\nMlijeko 1L,6.99\nMlijeko 1L,6.99\n").unwrap();

        let profiles = StoreProfiles::new(vec![
            profile("tommy", ';', DecimalSeparator::Comma),
            profile("spar", ',', DecimalSeparator::Period),
            profile("lidl", ',', DecimalSeparator::Period),
        ])
        .unwrap();

        let result = Consolidator::new(&profiles).consolidate(dir.path());
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.duplicates_removed, 1);
        assert_eq!(result.distinct_names, 2);
        assert_eq!(
            result.stores[2].status,
            StoreStatus::Skipped("unavailable")
        );

        let milk: Vec<_> = result.items.iter().filter(|i| i.name == "Mlijeko 1L").collect();
        assert_eq!(milk.len(), 2);
        assert!(milk.iter().all(|i| i.id == milk[0].id && i.price == Price::from_cents(699)));

        let mut sorted = result.items.clone();
        sorted.sort();
        assert_eq!(sorted, result.items);
    }
}
