pub const GRAM: &str = "g";
pub const MILLILITRE: &str = "ml";
pub const PIECE: &str = "kom";

/// Unit tokens that all mean "pieces"
pub const PIECE_SYNONYMS: [&str; 7] = ["komad", "komada", "komadi", "psc", "pcs", "st", "kos"];

/// Convert a magnitude in a raw unit into base units (g, ml, kom).
///
/// Rules are checked top to bottom and the first match wins. Unrecognized
/// units pass through as the cleaned lowercase token. A missing magnitude
/// passes through with an empty unit.
pub fn standardize_unit(unit: Option<&str>, quantity: Option<f64>) -> (Option<f64>, String) {
    let (Some(unit), Some(q)) = (unit, quantity) else {
        return (quantity, String::new());
    };

    let u = unit.to_lowercase().trim().replace('.', "");

    let (value, canonical) = if u.contains("kg") || u == "kilogram" {
        (q * 1000.0, GRAM)
    } else if u.contains('g') {
        (q, GRAM)
    } else if u == "l" || u.contains("litra") || u.contains("lit") {
        (q * 1000.0, MILLILITRE)
    } else if u.contains("ml") {
        (q, MILLILITRE)
    } else if u.contains("cl") {
        (q * 10.0, MILLILITRE)
    } else if u.contains("dl") {
        (q * 100.0, MILLILITRE)
    } else if u.starts_with("kom") || PIECE_SYNONYMS.contains(&u.as_str()) || u.contains("kom") {
        (q, PIECE)
    } else {
        return (Some(q), u);
    };

    (Some(value), canonical.to_string())
}
