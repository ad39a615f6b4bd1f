use crate::error::{OverxrptError, Result};

/// Report marker for a dose below the reporting threshold
pub const MINIMAL_DOSE: &str = "M";

/// Parses a dose cell in mSv
///
/// The minimal marker `M` reads as zero.
///
/// # Example
///
/// ```
/// use overxrpt_core::parse_dose;
///
/// assert_eq!(parse_dose("M").unwrap(), 0.0);
/// assert_eq!(parse_dose("1.25").unwrap(), 1.25);
/// assert!(parse_dose("n/a").is_err());
/// ```
pub fn parse_dose(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case(MINIMAL_DOSE) {
        return Ok(0.0);
    }

    let dose: f64 = trimmed
        .parse()
        .map_err(|_| OverxrptError::InvalidValue(format!("dose '{}' is not a number", s)))?;

    if !dose.is_finite() || dose < 0.0 {
        return Err(OverxrptError::InvalidValue(format!(
            "dose '{}' is out of range",
            s
        )));
    }

    Ok(dose)
}
