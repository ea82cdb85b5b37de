use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::domain::DecimalSeparator;
use crate::error::{CatalogError, Result};

/// Where the pipeline reads store exports and writes its tables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn consolidated_path(&self) -> PathBuf {
        self.data_dir.join(constants::CONSOLIDATED_FILE)
    }

    pub fn normalized_path(&self) -> PathBuf {
        self.data_dir.join(constants::NORMALIZED_FILE)
    }

    pub fn matched_path(&self) -> PathBuf {
        self.data_dir.join(constants::MATCHED_FILE)
    }
}

/// Column index of every field a store export can carry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMap {
    pub name: usize,
    pub price: usize,
    #[serde(default)]
    pub brand: Option<usize>,
    #[serde(default)]
    pub net_quantity: Option<usize>,
    #[serde(default)]
    pub unit_of_measure: Option<usize>,
    #[serde(default)]
    pub category: Option<usize>,
}

impl ColumnMap {
    pub fn new(name: usize, price: usize) -> Self {
        Self {
            name,
            price,
            brand: None,
            net_quantity: None,
            unit_of_measure: None,
            category: None,
        }
    }

    /// Highest configured index; rows must have more columns than this
    pub fn max_index(&self) -> usize {
        [
            Some(self.name),
            Some(self.price),
            self.brand,
            self.net_quantity,
            self.unit_of_measure,
            self.category,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }
}

/// Expected header labels, checked against the first line of the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeaderLabels {
    pub name: Option<String>,
    pub price: Option<String>,
    pub brand: Option<String>,
    pub net_quantity: Option<String>,
    pub unit_of_measure: Option<String>,
    pub category: Option<String>,
}

impl HeaderLabels {
    pub fn is_empty(&self) -> bool {
        self == &HeaderLabels::default()
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_encodings() -> Vec<String> {
    vec!["utf-8".to_string()]
}

fn default_header_lines() -> usize {
    1
}

/// Declarative description of one retailer's export layout.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreProfile {
    pub store: String,
    /// File name inside the data directory; defaults to `<store>.csv`
    #[serde(default)]
    pub file: Option<String>,
    pub columns: ColumnMap,
    #[serde(default)]
    pub header_labels: HeaderLabels,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// `None` keeps standard double-quote handling
    #[serde(default)]
    pub quote: Option<char>,
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
    pub decimal_separator: DecimalSeparator,
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,
}

impl StoreProfile {
    pub fn builtin(
        store: &str,
        columns: ColumnMap,
        delimiter: char,
        encodings: &[&str],
        decimal_separator: DecimalSeparator,
        quote: Option<char>,
    ) -> Self {
        Self {
            store: store.to_string(),
            file: None,
            columns,
            header_labels: HeaderLabels::default(),
            delimiter,
            quote,
            encodings: encodings.iter().map(|e| e.to_string()).collect(),
            decimal_separator,
            header_lines: 1,
        }
    }

    pub fn file_name(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| format!("{}.csv", self.store))
    }

    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.file_name())
    }

    fn validate(&self) -> Result<()> {
        if self.store.trim().is_empty() {
            return Err(CatalogError::Config("store profile with empty store name".to_string()));
        }
        if !self.delimiter.is_ascii() {
            return Err(CatalogError::Config(format!(
                "store '{}': delimiter '{}' must be a single ASCII character",
                self.store, self.delimiter
            )));
        }
        if let Some(q) = self.quote {
            if !q.is_ascii() {
                return Err(CatalogError::Config(format!(
                    "store '{}': quote '{}' must be a single ASCII character",
                    self.store, q
                )));
            }
        }
        if self.encodings.is_empty() {
            return Err(CatalogError::Config(format!(
                "store '{}': at least one candidate encoding is required",
                self.store
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StoresFile {
    #[serde(rename = "store", default)]
    stores: Vec<StoreProfile>,
}

/// The ordered set of store profiles for one run. Order drives id assignment.
#[derive(Debug, Clone)]
pub struct StoreProfiles {
    profiles: Vec<StoreProfile>,
}

impl StoreProfiles {
    pub fn new(profiles: Vec<StoreProfile>) -> Result<Self> {
        let set = Self { profiles };
        set.validate()?;
        Ok(set)
    }

    /// The six retailer layouts the catalog was built around
    pub fn builtin() -> Self {
        use DecimalSeparator::{Comma, Period};
        let legacy = ["utf-8", "cp1250", "iso-8859-2"];

        Self {
            profiles: vec![
                StoreProfile::builtin(constants::TOMMY, ColumnMap::new(2, 7), ',', &["utf-8"], Comma, None),
                StoreProfile::builtin(constants::SPAR, ColumnMap::new(0, 5), ';', &legacy, Period, None),
                StoreProfile::builtin(constants::LIDL, ColumnMap::new(0, 6), ',', &legacy, Period, None),
                StoreProfile::builtin(constants::KONZUM, ColumnMap::new(0, 5), ',', &["utf-8"], Period, None),
                StoreProfile::builtin(constants::EUROSPIN, ColumnMap::new(0, 5), ';', &["utf-8"], Period, Some('"')),
                StoreProfile::builtin(constants::STUDENAC, ColumnMap::new(0, 6), ',', &legacy, Period, None),
            ],
        }
    }

    /// Load `[[store]]` tables from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read store config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: StoresFile = toml::from_str(content)?;
        Self::new(file.stores)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoreProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.store.as_str()) {
                return Err(CatalogError::Config(format!(
                    "store '{}' is configured more than once",
                    profile.store
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_follow_store_order() {
        let profiles = StoreProfiles::builtin();
        let names: Vec<&str> = profiles.iter().map(|p| p.store.as_str()).collect();
        assert_eq!(names, constants::get_builtin_stores());
        assert!(profiles.validate().is_ok());
    }

    #[test]
    fn test_load_profiles_from_toml() {
        let toml = r#"
            [[store]]
            store = "konzum"
            decimal_separator = ","
            delimiter = ";"
            encodings = ["utf-8", "windows-1250"]
            columns = { name = 1, price = 4, net_quantity = 2, unit_of_measure = 3 }
            header_labels = { name = "naziv", price = "cijena" }

            [[store]]
            store = "spar"
            file = "spar_export.csv"
            decimal_separator = "."
            columns = { name = 0, price = 5 }
        "#;

        let profiles = StoreProfiles::from_toml_str(toml).unwrap();
        assert_eq!(profiles.len(), 2);

        let konzum = profiles.iter().next().unwrap();
        assert_eq!(konzum.delimiter, ';');
        assert_eq!(konzum.decimal_separator, DecimalSeparator::Comma);
        assert_eq!(konzum.columns.max_index(), 4);
        assert_eq!(konzum.header_labels.name.as_deref(), Some("naziv"));
        assert_eq!(konzum.header_lines, 1);
        assert_eq!(konzum.file_name(), "konzum.csv");

        let spar = profiles.iter().nth(1).unwrap();
        assert_eq!(spar.file_name(), "spar_export.csv");
        assert_eq!(spar.encodings, vec!["utf-8".to_string()]);
        assert!(spar.header_labels.is_empty());
    }

    #[test]
    fn test_duplicate_store_is_rejected() {
        let toml = r#"
            [[store]]
            store = "lidl"
            decimal_separator = "."
            columns = { name = 0, price = 1 }

            [[store]]
            store = "lidl"
            decimal_separator = "."
            columns = { name = 0, price = 1 }
        "#;
        assert!(matches!(
            StoreProfiles::from_toml_str(toml),
            Err(CatalogError::Config(_))
        ));
    }

    #[test]
    fn test_empty_store_name_is_rejected() {
        let toml = r#"
            [[store]]
            store = "  "
            decimal_separator = "."
            columns = { name = 0, price = 1 }
        "#;
        assert!(StoreProfiles::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_example_store_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/stores.example.toml");
        let profiles = StoreProfiles::load(&path).unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.store.as_str()).collect();
        assert_eq!(names, vec!["tommy", "spar", "konzum"]);
    }
}
