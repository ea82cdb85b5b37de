use crate::domain::DecimalSeparator;
use crate::error::PriceError;

/// Convert a raw price token into a non-negative number.
///
/// With comma-decimal exports every `.` is a thousands separator; with
/// period-decimal exports every `,` is. After that only digits, `.` and a
/// leading `-` survive, and a bare leading `.` gets a `0` in front.
pub fn parse_price(raw: &str, separator: DecimalSeparator) -> Result<f64, PriceError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(PriceError::Empty);
    }

    let standardized = match separator {
        DecimalSeparator::Comma => token.replace('.', "").replace(',', "."),
        DecimalSeparator::Period => token.replace(',', ""),
    };

    let mut cleaned = String::with_capacity(standardized.len());
    for c in standardized.chars() {
        if c.is_ascii_digit() || c == '.' || (c == '-' && cleaned.is_empty()) {
            cleaned.push(c);
        }
    }

    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    }

    let value: f64 = cleaned
        .parse()
        .map_err(|_| PriceError::Unparseable(token.to_string()))?;

    if value < 0.0 {
        return Err(PriceError::Negative(value));
    }

    Ok(value)
}
