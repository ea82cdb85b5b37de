pub mod quantity;
pub mod text;
pub mod units;

use tracing::debug;

use crate::domain::{ConsolidatedItem, NormalizedItem};

pub use quantity::parse_quantity;
pub use text::{clean_text, stem};
pub use units::standardize_unit;

/// Trait for turning consolidated rows into canonical, comparable rows
pub trait Normalizer: Send + Sync {
    /// Normalize one row. `None` means the row cannot be recovered and is dropped.
    fn normalize(&self, item: &ConsolidatedItem) -> Option<NormalizedItem>;
}

/// Outcome of normalizing a whole table
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub items: Vec<NormalizedItem>,
    pub dropped: usize,
}

/// Cleans text fields and converts quantities into g, ml or kom
#[derive(Debug, Default, Clone)]
pub struct DefaultNormalizer;

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self
    }

    fn clean_optional(value: Option<&str>) -> Option<String> {
        let cleaned = clean_text(value);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, item: &ConsolidatedItem) -> Option<NormalizedItem> {
        if item.store.trim().is_empty() {
            debug!(id = item.id, "row has no store, dropping");
            return None;
        }

        let name = clean_text(Some(&item.name));
        if name.is_empty() {
            debug!(id = item.id, store = %item.store, "name empty after cleaning, dropping");
            return None;
        }

        let magnitude = parse_quantity(item.net_quantity.as_deref());
        let (standardized_quantity, standardized_unit) =
            standardize_unit(item.unit_of_measure.as_deref(), magnitude);

        Some(NormalizedItem {
            id: item.id,
            name,
            price: item.price,
            store: item.store.clone(),
            brand: Self::clean_optional(item.brand.as_deref()),
            net_quantity: item.net_quantity.clone(),
            unit_of_measure: item.unit_of_measure.clone(),
            category: Self::clean_optional(item.category.as_deref()),
            standardized_quantity,
            standardized_unit,
        })
    }
}

/// Run `normalizer` over every row, keeping input order.
pub fn normalize_all(normalizer: &dyn Normalizer, items: &[ConsolidatedItem]) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    for item in items {
        match normalizer.normalize(item) {
            Some(normalized) => outcome.items.push(normalized),
            None => outcome.dropped += 1,
        }
    }
    outcome
}
