//! Read-only view of the priced catalog, grouped by product id.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::infra::csv_table_adapter::read_table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEntry {
    pub price: f64,
    pub store: String,
}

/// One product with its offers across stores, cheapest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub name: String,
    pub prices: Vec<PriceEntry>,
}

impl CatalogEntry {
    pub fn store_count(&self) -> usize {
        self.prices.iter().map(|p| p.store.as_str()).collect::<HashSet<_>>().len()
    }
}

/// Loose row shape shared by the consolidated and matched tables. Only
/// these columns are read; unparseable values are filtered after reading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub store: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<u64, CatalogEntry>,
}

impl Catalog {
    /// Group rows by id. Rows without a numeric id, name or store are
    /// ignored; rows with a bad price contribute no offer. Products left
    /// without any offer are not listed.
    pub fn from_rows(rows: impl IntoIterator<Item = CatalogRow>) -> Self {
        let mut entries: BTreeMap<u64, CatalogEntry> = BTreeMap::new();

        for row in rows {
            let Ok(id) = row.id.trim().parse::<u64>() else {
                continue;
            };
            let name = row.name.trim();
            let store = row.store.trim();
            if name.is_empty() || store.is_empty() {
                continue;
            }

            let entry = entries.entry(id).or_insert_with(|| CatalogEntry {
                id,
                name: name.to_string(),
                prices: Vec::new(),
            });

            match row.price.trim().parse::<f64>() {
                Ok(price) if price.is_finite() && price >= 0.0 => entry.prices.push(PriceEntry {
                    price,
                    store: store.to_string(),
                }),
                _ => {}
            }
        }

        entries.retain(|_, entry| !entry.prices.is_empty());
        for entry in entries.values_mut() {
            entry
                .prices
                .sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.store.cmp(&b.store)));
        }

        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let table = read_table::<CatalogRow>(path)?;
        let catalog = Self::from_rows(table.rows);
        info!(path = %path.display(), items = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Prefer the matched table; fall back to the consolidated one.
    pub fn load_from(config: &PipelineConfig) -> Result<Self> {
        let matched = config.matched_path();
        if matched.exists() {
            return Self::load(&matched);
        }
        warn!(
            path = %matched.display(),
            "matched table not found, serving the consolidated table"
        );
        Self::load(&config.consolidated_path())
    }

    /// Products in id order, optionally only those offered by at least
    /// `min_stores` distinct stores.
    pub fn list(&self, min_stores: Option<usize>, limit: usize) -> Vec<&CatalogEntry> {
        self.entries
            .values()
            .filter(|entry| min_stores.map_or(true, |min| entry.store_count() >= min))
            .take(limit)
            .collect()
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn row(id: &str, name: &str, price: &str, store: &str) -> CatalogRow {
        CatalogRow {
            id: id.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            store: store.to_string(),
        }
    }

    fn sample() -> Catalog {
        Catalog::from_rows(vec![
            row("2", "kruh", "1.20", "spar"),
            row("1", "mlijeko 1l", "7.49", "lidl"),
            row("1", "mlijeko 1l", "6.99", "tommy"),
            row("1", "mlijeko 1l", "6.99", "spar"),
            row("3", "sir", "", "spar"),
            row("x", "bad id", "1.00", "spar"),
            row("4", "", "1.00", "spar"),
        ])
    }

    #[test]
    fn test_groups_and_orders_prices() {
        let catalog = sample();
        assert_eq!(catalog.len(), 2);

        let milk = catalog.get(1).unwrap();
        let stores: Vec<_> = milk.prices.iter().map(|p| p.store.as_str()).collect();
        assert_eq!(stores, vec!["spar", "tommy", "lidl"]);
        assert_eq!(milk.prices[0].price, 6.99);
    }

    #[test]
    fn test_products_without_offers_are_hidden() {
        let catalog = sample();
        assert!(catalog.get(3).is_none());
        assert!(catalog.get(4).is_none());
    }

    #[test]
    fn test_list_filters_and_limits() {
        let catalog = sample();
        let ids: Vec<_> = catalog.list(None, 100).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);

        let multi: Vec<_> = catalog.list(Some(2), 100).iter().map(|e| e.id).collect();
        assert_eq!(multi, vec![1]);

        assert_eq!(catalog.list(None, 1).len(), 1);
    }

    #[test]
    fn test_load_falls_back_to_consolidated() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("consolidated_items.csv"),
            "id,name,price,store\n1,Sir,9.99,spar\n",
        )
        .unwrap();

        let catalog = Catalog::load_from(&PipelineConfig::new(dir.path())).unwrap();
        assert_eq!(catalog.get(1).unwrap().name, "Sir");
    }

    #[test]
    fn test_missing_tables_give_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::load_from(&PipelineConfig::new(dir.path())).unwrap();
        assert!(catalog.is_empty());
    }
}
