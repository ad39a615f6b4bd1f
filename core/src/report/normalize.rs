//! Cell text clean-up for report tables

/// Abbreviated badge uses and their full wording
const BADGE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("OTHERWHBODY", "OTHER WHOLE BODY"),
    ("L FINGER", "LEFT FINGER"),
    ("LFINGER", "LEFT FINGER"),
    ("R FINGER", "RIGHT FINGER"),
    ("RFINGER", "RIGHT FINGER"),
];

/// Removes line breaks that wrapped cell text in the report export
pub fn strip_newlines(s: &str) -> String {
    s.replace(['\r', '\n'], "").trim().to_string()
}

/// Normalises a header cell for column matching
///
/// Line breaks become spaces, runs of whitespace collapse, and the result is
/// lowercased, so `"Begin\nDate"` matches `"begin date"`.
pub fn header_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Expands abbreviated badge uses and lowercases the result
///
/// Only whole-cell abbreviations are expanded.
pub fn standardise_use(s: &str) -> String {
    let cleaned = strip_newlines(s);
    let expanded = BADGE_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| cleaned.eq_ignore_ascii_case(abbr))
        .map(|(_, full)| full.to_string())
        .unwrap_or(cleaned);
    expanded.to_lowercase()
}

/// Formats a `SURNAME, FORENAME` wearer name for the notification
///
/// - `SMITH, JOHN` → `J. Smith`
/// - `SMITH, DR` → `Dr Smith`
/// - `SMITH,` → `SMITH`
/// - names without a comma are kept as they are
pub fn format_name(name: &str) -> String {
    let Some((surname, forename)) = name.split_once(',') else {
        return name.trim().to_string();
    };
    let surname = surname.trim();
    let forename = forename.trim();

    if forename == "DR" {
        format!("{} {}", capitalize(forename), capitalize(surname))
    } else if let Some(initial) = forename.chars().next() {
        format!("{}. {}", initial, capitalize(surname))
    } else {
        surname.to_string()
    }
}

/// Uppercases the first character and lowercases the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
