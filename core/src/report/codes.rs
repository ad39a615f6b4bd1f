use crate::error::{OverxrptError, Result};
use std::fmt;
use std::path::Path;

/// File name marker preceding the account code
pub const ACCOUNT_LOCATOR: &str = "_AC";
/// Length of an account code
pub const ACCOUNT_CODE_LEN: usize = 6;
/// File name marker preceding the subaccount code
pub const SUBACCOUNT_LOCATOR: &str = "_SUB";
/// Length of a subaccount code
pub const SUBACCOUNT_CODE_LEN: usize = 3;

/// Account and subaccount a report belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ReportCodes {
    pub account: String,
    pub subaccount: String,
}

impl ReportCodes {
    /// Creates codes from explicit values
    pub fn new(account: impl Into<String>, subaccount: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            subaccount: subaccount.into(),
        }
    }

    /// Reads the codes embedded in a report file name
    ///
    /// Report exports are named like `OVXRPT_AC123456_SUB0A1_20240301.xlsx`:
    /// six characters after `_AC` and three after `_SUB`.
    ///
    /// # Example
    ///
    /// ```
    /// use overxrpt_core::ReportCodes;
    ///
    /// let codes = ReportCodes::from_file_name("OVXRPT_AC123456_SUB0A1_20240301.xlsx").unwrap();
    /// assert_eq!(codes.account, "123456");
    /// assert_eq!(codes.subaccount, "0A1");
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self> {
        Ok(Self {
            account: code_after(name, ACCOUNT_LOCATOR, ACCOUNT_CODE_LEN)?,
            subaccount: code_after(name, SUBACCOUNT_LOCATOR, SUBACCOUNT_CODE_LEN)?,
        })
    }

    /// Reads the codes from a report path, letting explicit values win
    ///
    /// A code is only parsed from the file name when no override is given,
    /// so a report with a non-standard name can still be processed.
    pub fn resolve(
        path: &Path,
        account: Option<&str>,
        subaccount: Option<&str>,
    ) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let account = match account {
            Some(code) => code.to_string(),
            None => code_after(&name, ACCOUNT_LOCATOR, ACCOUNT_CODE_LEN)?,
        };
        let subaccount = match subaccount {
            Some(code) => code.to_string(),
            None => code_after(&name, SUBACCOUNT_LOCATOR, SUBACCOUNT_CODE_LEN)?,
        };

        Ok(Self {
            account,
            subaccount,
        })
    }
}

impl fmt::Display for ReportCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account {} / subaccount {}", self.account, self.subaccount)
    }
}

fn code_after(name: &str, locator: &str, len: usize) -> Result<String> {
    let start = name
        .find(locator)
        .map(|i| i + locator.len())
        .ok_or_else(|| {
            OverxrptError::MalformedInput(format!(
                "report file name '{}' has no '{}' code",
                name, locator
            ))
        })?;

    let code: String = name[start..].chars().take(len).collect();
    if code.chars().count() < len {
        return Err(OverxrptError::MalformedInput(format!(
            "report file name '{}' has a truncated '{}' code",
            name, locator
        )));
    }

    Ok(code)
}
