//! Investigation levels workbook
//!
//! The workbook has one sheet per account (sheet names contain the account
//! code). Each sheet is a table keyed by account/subaccount code:
//!
//! ```text
//! | Code   | Name   | Whole Body (DDE) |           |        | Lens (LDE) | ... | Contact email | CC        |
//! |        |        | Monthly          | Annual    | Urgent | Annual     | ... |               |           |
//! | 123456 | Trust  | 1                | 6         | 10     | 15         | ... | a@trust   | b@trust   |
//! | 0A1    | Ward 1 | DEFAULT          |           |        |            | ... | c@trust   | d@trust   |
//! ```
//!
//! Category headers span their subcategories, so both header rows are filled
//! to the right before use.

mod header;

pub use header::{contains_word, LevelHeader};

use crate::error::{OverxrptError, Result};
use crate::report::ReportCodes;
use crate::types::{BadgeType, PeriodType};
use crate::workbook::{SheetGrid, Workbook};
use log::{debug, info};
use std::path::Path;

/// One level cell of a threshold entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct LevelCell {
    pub header: LevelHeader,
    pub value: String,
}

/// Investigation levels resolved for one badge and wear period
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Levels {
    /// Investigation level in mSv
    pub level: f64,

    /// Urgent level in mSv, if the sheet gives one
    pub urgent: Option<f64>,

    /// Column the investigation level was read from
    pub header: LevelHeader,
}

/// One row of the levels sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ThresholdEntry {
    /// Account or subaccount code
    pub code: String,

    /// Descriptive name of the account or subaccount
    pub name: String,

    /// Level cells in sheet order
    pub cells: Vec<LevelCell>,

    /// Contact email
    pub contact: String,

    /// CC email, `None` when the sheet has no CC column
    pub cc: Option<String>,
}

impl ThresholdEntry {
    /// Returns whether this entry defers to its account's levels
    pub fn is_default(&self) -> bool {
        self.cells
            .iter()
            .any(|c| c.value.to_uppercase().contains("DEFAULT"))
    }

    /// Finds the investigation and urgent levels for a badge and period
    ///
    /// Tries every badge header term against every period header term, most
    /// specific first, and takes the first matching column.
    ///
    /// # Errors
    ///
    /// - [`OverxrptError::Lookup`] if no column matches
    /// - [`OverxrptError::InvalidValue`] if the level is not a number, or the
    ///   urgent level is present but not a number
    pub fn levels_for(&self, badge: BadgeType, period_type: PeriodType) -> Result<Levels> {
        let cell = self
            .find_cell(badge, period_type)?
            .ok_or_else(|| {
                OverxrptError::Lookup(format!(
                    "no {} {} level column for entry {}",
                    badge,
                    period_type,
                    self.code
                ))
            })?;

        let level = cell.value.trim().parse::<f64>().map_err(|_| {
            OverxrptError::InvalidValue(format!(
                "required investigation level missing for entry {} ({}): '{}'",
                self.code, cell.header, cell.value
            ))
        })?;

        let urgent = self
            .cells
            .iter()
            .find(|c| c.header.category == cell.header.category && c.header.is_urgent())
            .map(|c| c.value.trim())
            .filter(|v| !v.is_empty())
            .map(|v| {
                v.parse::<f64>().map_err(|_| {
                    OverxrptError::InvalidValue(format!(
                        "urgent level for entry {} ({}) is not a number: '{}'",
                        self.code, cell.header.category, v
                    ))
                })
            })
            .transpose()?;

        debug!(
            "Entry {}: {} {} → level {} (urgent {:?}) from '{}'",
            self.code, badge, period_type, level, urgent, cell.header
        );

        Ok(Levels {
            level,
            urgent,
            header: cell.header.clone(),
        })
    }

    fn find_cell(&self, badge: BadgeType, period_type: PeriodType) -> Result<Option<&LevelCell>> {
        for badge_term in badge.header_hierarchy() {
            for period_term in period_type.header_hierarchy() {
                for cell in &self.cells {
                    if cell.header.matches(badge_term, period_term)? {
                        return Ok(Some(cell));
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Contents of one account sheet
#[derive(Debug, Clone, PartialEq)]
pub struct LevelsTable {
    pub sheet_name: String,
    pub entries: Vec<ThresholdEntry>,
}

impl LevelsTable {
    /// Loads the sheet for an account from the levels workbook
    pub fn load(path: &Path, account_code: &str) -> Result<Self> {
        info!("Loading investigation levels: {}", path.display());
        let mut workbook = Workbook::open(path)?;
        let sheet = select_sheet(&workbook.sheet_names(), account_code)?;
        info!("Using levels sheet '{}'", sheet);
        let grid = workbook.grid(&sheet)?;
        Self::from_grid(&grid)
    }

    /// Builds the table from a sheet
    ///
    /// The code and name columns are found by header text in the first
    /// row; the table ends at the `CC` column, or at the contact `email`
    /// column on sheets without one.
    pub fn from_grid(grid: &SheetGrid) -> Result<Self> {
        let malformed = |what: &str| {
            OverxrptError::MalformedInput(format!("levels sheet '{}': {}", grid.name(), what))
        };

        let categories = filled_right(grid.row(0), grid.width());
        let subcategories = filled_right(grid.row(1), grid.width());
        let first_row = grid.row(0);

        let find_first = |term: &str| {
            first_row
                .iter()
                .position(|text| text.to_lowercase().contains(term))
        };
        let find_word = |term: &str| -> Result<Option<usize>> {
            for (i, text) in first_row.iter().enumerate() {
                if contains_word(term, text)? {
                    return Ok(Some(i));
                }
            }
            Ok(None)
        };

        let code_col = find_first("code").ok_or_else(|| malformed("no 'code' column"))?;
        let name_col = find_first("name").ok_or_else(|| malformed("no 'name' column"))?;
        let email_col = find_word("email")?.ok_or_else(|| malformed("no contact email column"))?;
        let cc_col = find_word("CC")?;
        let end_col = cc_col.unwrap_or(email_col);

        let level_cols: Vec<usize> = (0..=end_col)
            .filter(|&c| c != code_col && c != name_col && c != email_col && Some(c) != cc_col)
            .collect();

        let mut entries = Vec::new();
        for r in 2..grid.height() {
            let code = grid.cell(r, code_col).to_string();
            if code.is_empty() {
                continue;
            }

            let cells = level_cols
                .iter()
                .map(|&c| LevelCell {
                    header: LevelHeader::new(categories[c].clone(), subcategories[c].clone()),
                    value: grid.cell(r, c).to_string(),
                })
                .collect();

            entries.push(ThresholdEntry {
                code,
                name: grid.cell(r, name_col).to_string(),
                cells,
                contact: grid.cell(r, email_col).to_string(),
                cc: cc_col.map(|c| grid.cell(r, c).to_string()),
            });
        }

        debug!(
            "Levels sheet '{}': {} entries, {} level columns",
            grid.name(),
            entries.len(),
            level_cols.len()
        );

        Ok(Self {
            sheet_name: grid.name().to_string(),
            entries,
        })
    }

    /// Keeps only the entries for a report's account and subaccount
    ///
    /// # Errors
    ///
    /// - [`OverxrptError::Lookup`] if the subaccount has no entry, or more
    ///   than one
    /// - [`OverxrptError::InvalidValue`] if the subaccount's contact or CC
    ///   address is missing
    pub fn crop(&self, codes: &ReportCodes) -> Result<AccountLevels> {
        let entries: Vec<ThresholdEntry> = self
            .entries
            .iter()
            .filter(|e| e.code == codes.account || e.code == codes.subaccount)
            .cloned()
            .collect();

        let levels = AccountLevels {
            sheet_name: self.sheet_name.clone(),
            codes: codes.clone(),
            entries,
        };

        let subaccount = levels.entry(&codes.subaccount)?;
        if !subaccount.contact.contains('@') {
            return Err(OverxrptError::InvalidValue(format!(
                "contact email for subaccount {} not found",
                codes.subaccount
            )));
        }
        if let Some(cc) = &subaccount.cc {
            if !cc.contains('@') {
                return Err(OverxrptError::InvalidValue(format!(
                    "site lead CC for subaccount {} not found",
                    codes.subaccount
                )));
            }
        }

        Ok(levels)
    }
}

/// Threshold entries cropped to one report's account and subaccount
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLevels {
    pub sheet_name: String,
    pub codes: ReportCodes,
    pub entries: Vec<ThresholdEntry>,
}

impl AccountLevels {
    /// Finds the single entry with the given code
    ///
    /// # Errors
    ///
    /// Returns [`OverxrptError::Lookup`] when no entry, or more than one
    /// entry, has the code.
    pub fn entry(&self, code: &str) -> Result<&ThresholdEntry> {
        let mut matches = self.entries.iter().filter(|e| e.code == code);
        let first = matches.next().ok_or_else(|| {
            OverxrptError::Lookup(format!(
                "code {} not found in levels sheet '{}'",
                code, self.sheet_name
            ))
        })?;
        if matches.next().is_some() {
            return Err(OverxrptError::Lookup(format!(
                "code {} appears more than once in levels sheet '{}'",
                code, self.sheet_name
            )));
        }
        Ok(first)
    }

    /// Entry for the report's subaccount
    pub fn subaccount(&self) -> Result<&ThresholdEntry> {
        self.entry(&self.codes.subaccount)
    }

    /// Contact address for the notification
    pub fn contact(&self) -> Result<&str> {
        Ok(&self.subaccount()?.contact)
    }

    /// CC address for the notification
    pub fn cc(&self) -> Result<Option<&str>> {
        Ok(self.subaccount()?.cc.as_deref())
    }
}

/// Picks the account's sheet from the workbook's sheet names
///
/// Among sheets whose name contains the account code, the one with the
/// least text besides the code wins; the first one wins a tie.
///
/// # Example
///
/// ```
/// use overxrpt_core::levels::select_sheet;
///
/// let names = vec!["123456 archive".to_string(), "123456".to_string(), "999999".to_string()];
/// assert_eq!(select_sheet(&names, "123456").unwrap(), "123456");
/// ```
pub fn select_sheet(names: &[String], account_code: &str) -> Result<String> {
    names
        .iter()
        .filter(|name| name.contains(account_code))
        .min_by_key(|name| name.replace(account_code, "").chars().count())
        .cloned()
        .ok_or_else(|| {
            OverxrptError::Lookup(format!(
                "no levels sheet for account {} (sheets: {})",
                account_code,
                names.join(", ")
            ))
        })
}

/// Fills empty header cells from the left
fn filled_right(row: &[String], width: usize) -> Vec<String> {
    let mut current = String::new();
    (0..width)
        .map(|i| {
            let text = row.get(i).map(|s| s.trim()).unwrap_or("");
            if !text.is_empty() {
                current = text.to_string();
            }
            current.clone()
        })
        .collect()
}
