use once_cell::sync::Lazy;
use regex::Regex;

// "<count>x<amount>", e.g. "2x1.5L" or "6 X 0,33"
static MULTIPACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*x\s*([\d,.]+)").expect("multipack pattern is valid"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.]+").expect("number pattern is valid"));

/// Extract a numeric magnitude from free-text quantity.
///
/// For multi-packs only the per-unit amount is kept; the pack count is
/// discarded, not multiplied in.
pub fn parse_quantity(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;

    let amount = match MULTIPACK.captures(raw) {
        Some(caps) => caps.get(2).map_or(raw, |m| m.as_str()),
        None => raw,
    };

    let standardized = normalize_decimal(amount);
    let number = NUMBER.find(&standardized)?;
    number.as_str().parse::<f64>().ok()
}

/// With a comma present every '.' is a thousands separator and the comma is
/// the decimal point; otherwise every '.' but the last is a thousands
/// separator.
fn normalize_decimal(text: &str) -> String {
    if text.contains(',') {
        return text.replace('.', "").replace(',', ".");
    }

    match text.rfind('.') {
        Some(last) => {
            let (head, tail) = text.split_at(last);
            format!("{}{}", head.replace('.', ""), tail)
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipack_keeps_per_unit_amount() {
        assert_eq!(parse_quantity(Some("2x1.5L")), Some(1.5));
        assert_eq!(parse_quantity(Some("6 X 0,33 l")), Some(0.33));
        assert_eq!(parse_quantity(Some("3x80g")), Some(80.0));
    }

    #[test]
    fn test_plain_quantities() {
        assert_eq!(parse_quantity(Some("500 g")), Some(500.0));
        assert_eq!(parse_quantity(Some("1")), Some(1.0));
        assert_eq!(parse_quantity(Some("0,5")), Some(0.5));
        assert_eq!(parse_quantity(Some(".75 l")), Some(0.75));
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(parse_quantity(Some("1.234,5")), Some(1234.5));
        assert_eq!(parse_quantity(Some("1.000.5")), Some(1000.5));
    }

    #[test]
    fn test_unparseable_quantities() {
        assert_eq!(parse_quantity(None), None);
        assert_eq!(parse_quantity(Some("")), None);
        assert_eq!(parse_quantity(Some("kom")), None);
        assert_eq!(parse_quantity(Some(". l")), None);
    }
}
