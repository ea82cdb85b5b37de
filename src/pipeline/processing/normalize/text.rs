//! Free-text cleanup for names, brands and categories.
//!
//! Abbreviation rules run in list order and each one sees the output of the
//! previous ones, so the order below is part of the contract.

use once_cell::sync::Lazy;
use regex::Regex;

/// One case-insensitive rewrite of a truncated token to its full word
pub struct AbbreviationRule {
    pub pattern: Regex,
    pub replacement: &'static str,
}

const ABBREVIATION_TABLE: [(&str, &str); 6] = [
    (r"\bmlij\.", "mlijeko"),
    (r"\bčok\.", "čokolada"),
    (r"\bpak\.", "pakiranje"),
    (r"\bkgb", "kilogram"),
    (r"\blb", "litra"),
    (r"\bkom\.", "komad"),
];

pub static ABBREVIATIONS: Lazy<Vec<AbbreviationRule>> = Lazy::new(|| {
    ABBREVIATION_TABLE
        .iter()
        .map(|&(pattern, replacement)| AbbreviationRule {
            pattern: Regex::new(&format!("(?i){}", pattern)).expect("abbreviation pattern is valid"),
            replacement,
        })
        .collect()
});

// Everything that is not a word character, whitespace, '.' or '\''
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.']").expect("punctuation pattern is valid"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Lowercase, trim, expand abbreviations, drop punctuation and collapse
/// whitespace. Absent input yields an empty string.
pub fn clean_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut cleaned = text.to_lowercase().trim().to_string();
    for rule in ABBREVIATIONS.iter() {
        cleaned = rule.pattern.replace_all(&cleaned, rule.replacement).into_owned();
    }

    let cleaned = PUNCTUATION.replace_all(&cleaned, "");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Stemming hook. Croatian stemming is out of scope, so this is the identity.
pub fn stem(text: &str) -> &str {
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses_whitespace() {
        assert_eq!(clean_text(Some("  Mlijeko   1L ")), "mlijeko 1l");
        assert_eq!(clean_text(Some("Kruh\tBijeli\n500g")), "kruh bijeli 500g");
    }

    #[test]
    fn test_expands_abbreviations_in_order() {
        assert_eq!(clean_text(Some("Mlij. trajno 2,8%")), "mlijeko trajno 28");
        assert_eq!(clean_text(Some("ČOK. mliječna")), "čokolada mliječna");
        assert_eq!(clean_text(Some("Jaja 10 kom.")), "jaja 10 komad");
        assert_eq!(clean_text(Some("Pak. 6x")), "pakiranje 6x");
    }

    #[test]
    fn test_full_word_is_not_expanded_again() {
        assert_eq!(clean_text(Some("Mlijeko 1L")), "mlijeko 1l");
        assert_eq!(clean_text(Some("komad")), "komad");
    }

    #[test]
    fn test_keeps_decimal_point_and_apostrophe() {
        assert_eq!(clean_text(Some("O'Hara's Sok 1.5L!")), "o'hara's sok 1.5l");
        assert_eq!(clean_text(Some("Sir (Gauda), 45%")), "sir gauda 45");
    }

    #[test]
    fn test_absent_text_is_empty() {
        assert_eq!(clean_text(None), "");
        assert_eq!(clean_text(Some("   ")), "");
    }

    #[test]
    fn test_stem_is_identity() {
        assert_eq!(stem("mlijeka"), "mlijeka");
    }
}
