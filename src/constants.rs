/// Table file names shared by every stage and the catalog server
pub const CONSOLIDATED_FILE: &str = "consolidated_items.csv";
pub const NORMALIZED_FILE: &str = "normalized_items.csv";
pub const MATCHED_FILE: &str = "matched_items_v1.csv";

/// Data directory used when neither `--data-dir` nor `CATALOG_DATA_DIR` is set
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_ENV: &str = "CATALOG_DATA_DIR";

// Built-in store names (also the export file stems)
pub const TOMMY: &str = "tommy";
pub const SPAR: &str = "spar";
pub const LIDL: &str = "lidl";
pub const KONZUM: &str = "konzum";
pub const EUROSPIN: &str = "eurospin";
pub const STUDENAC: &str = "studenac";

/// Get all built-in store names, in consolidation order
pub fn get_builtin_stores() -> Vec<&'static str> {
    vec![TOMMY, SPAR, LIDL, KONZUM, EUROSPIN, STUDENAC]
}
