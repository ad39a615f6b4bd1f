//! Threshold resolution
//!
//! Pairs every report row with exactly one threshold entry. A missing or
//! duplicated code is an error; nothing falls back silently except the
//! sheet's own `DEFAULT` marker, which points a subaccount at its account.

use crate::error::Result;
use crate::levels::{AccountLevels, ThresholdEntry};
use crate::report::ReportRow;
use log::debug;

/// A report row and the threshold entry its levels come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRow<'a> {
    pub row: &'a ReportRow,
    pub entry: &'a ThresholdEntry,
}

/// Finds the threshold entry for one row
///
/// # Errors
///
/// Returns [`crate::OverxrptError::Lookup`] if the row's subaccount code is
/// absent or ambiguous, or if it is marked `DEFAULT` and the account code is
/// absent or ambiguous.
pub fn resolve_entry<'a>(row: &ReportRow, levels: &'a AccountLevels) -> Result<&'a ThresholdEntry> {
    let entry = levels.entry(&row.subaccount_code)?;
    if entry.is_default() {
        debug!(
            "Subaccount {} uses the levels of account {}",
            row.subaccount_code, row.account_code
        );
        return levels.entry(&row.account_code);
    }
    Ok(entry)
}

/// Resolves every row, stopping at the first failure
pub fn resolve<'a>(rows: &'a [ReportRow], levels: &'a AccountLevels) -> Result<Vec<ResolvedRow<'a>>> {
    rows.iter()
        .map(|row| {
            resolve_entry(row, levels).map(|entry| ResolvedRow { row, entry })
        })
        .collect()
}
