use crate::error::{OverxrptError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Two-level column header of the levels sheet
///
/// The first header row names the category (e.g. `Whole Body (DDE)`), the
/// second the subcategory (e.g. `Monthly`, `Annual`, `Urgent`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct LevelHeader {
    pub category: String,
    pub subcategory: String,
}

impl LevelHeader {
    /// Creates a new header
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }

    /// Checks both levels against a category term and a subcategory term
    pub fn matches(&self, category_term: &str, subcategory_term: &str) -> Result<bool> {
        Ok(contains_word(category_term, &self.category)?
            && contains_word(subcategory_term, &self.subcategory)?)
    }

    /// Returns whether this is the urgent level column
    pub fn is_urgent(&self) -> bool {
        self.subcategory.trim().eq_ignore_ascii_case("urgent")
    }
}

impl fmt::Display for LevelHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.subcategory)
    }
}

/// Checks whether `text` contains `term` as whole words
///
/// Case-insensitive, with parentheses in `text` ignored, so `LDE` matches
/// `Lens (LDE)` but `LENS` does not match `LENSES`.
///
/// # Example
///
/// ```
/// use overxrpt_core::levels::contains_word;
///
/// assert!(contains_word("WHOLE BODY", "Whole Body (DDE)").unwrap());
/// assert!(contains_word("dde", "Whole Body (DDE)").unwrap());
/// assert!(!contains_word("LENS", "Lenses").unwrap());
/// ```
pub fn contains_word(term: &str, text: &str) -> Result<bool> {
    static PARENS: OnceLock<Regex> = OnceLock::new();
    let parens = PARENS.get_or_init(|| Regex::new(r"[()]").expect("Failed to compile regex"));

    let text = parens.replace_all(text, "");
    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term.trim())))
        .map_err(|e| OverxrptError::InvalidValue(format!("bad header term '{}': {}", term, e)))?;

    Ok(pattern.is_match(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DDE", "Whole Body (DDE)", true)]
    #[case("WHOLE BODY", "whole body", true)]
    #[case("EXTREMITY", "Extremity (SDE)", true)]
    #[case("EYES", "Lens of the eyes", true)]
    #[case("LENS", "Lenses", false)]
    #[case("collar", "Collar", true)]
    #[case("MONTHLY", "Monthly / wear period", true)]
    #[case("WEAR PERIOD", "Per wear period", true)]
    #[case("ANNUAL", "Annually", false)]
    fn test_contains_word(#[case] term: &str, #[case] text: &str, #[case] expected: bool) {
        assert_eq!(contains_word(term, text).unwrap(), expected);
    }

    #[test]
    fn test_header_matches_both_levels() {
        let header = LevelHeader::new("Whole Body (DDE)", "Monthly");
        assert!(header.matches("DDE", "MONTHLY").unwrap());
        assert!(!header.matches("DDE", "ANNUAL").unwrap());
        assert!(!header.matches("LENS", "MONTHLY").unwrap());
    }

    #[test]
    fn test_is_urgent() {
        assert!(LevelHeader::new("Lens", " URGENT ").is_urgent());
        assert!(!LevelHeader::new("Lens", "Annual").is_urgent());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LevelHeader::new("Lens (LDE)", "Annual").to_string(),
            "Lens (LDE) / Annual"
        );
    }
}
