use super::PeriodType;
use crate::error::{OverxrptError, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Wear period of a report row
///
/// The label is the wording used in notification sentences and is also the
/// key used to match a row against earlier notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Period {
    pub period_type: PeriodType,
    pub label: String,
}

impl Period {
    /// Derives the period from the report's begin and end dates
    ///
    /// - Monthly: month name and year of the begin date (`March 2024`)
    /// - Quarterly: `second quarter of 2024`, from the begin and end months
    /// - Year to date: begin date without the day (`2024-01`)
    ///
    /// # Errors
    ///
    /// Returns an error if a date is not `YYYY-MM-DD` or the quarterly
    /// months do not span a calendar quarter.
    ///
    /// # Example
    ///
    /// ```
    /// use overxrpt_core::{Period, PeriodType};
    ///
    /// let period = Period::from_dates(PeriodType::Quarterly, "2024-04-01", "2024-06-30").unwrap();
    /// assert_eq!(period.label, "second quarter of 2024");
    /// ```
    pub fn from_dates(period_type: PeriodType, begin: &str, end: &str) -> Result<Self> {
        let label = match period_type {
            PeriodType::Monthly => {
                let begin = parse_date(begin)?;
                format!("{} {}", begin.format("%B"), begin.year())
            }
            PeriodType::Quarterly => {
                let begin = parse_date(begin)?;
                let end = parse_date(end)?;
                let quarter = quarter_name(begin.month(), end.month()).ok_or_else(|| {
                    OverxrptError::InvalidValue(format!(
                        "quarterly period {} to {} does not span a calendar quarter",
                        begin, end
                    ))
                })?;
                format!("{} quarter of {}", quarter, end.year())
            }
            PeriodType::YearToDate => {
                let begin = parse_date(begin)?;
                begin.format("%Y-%m").to_string()
            }
        };

        Ok(Self { period_type, label })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Parses a report date (`YYYY-MM-DD`)
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| OverxrptError::InvalidValue(format!("invalid date '{}': {}", s, e)))
}

fn quarter_name(begin_month: u32, end_month: u32) -> Option<&'static str> {
    match (begin_month, end_month) {
        (1, 3) => Some("first"),
        (4, 6) => Some("second"),
        (7, 9) => Some("third"),
        (10, 12) => Some("fourth"),
        _ => None,
    }
}
