use crate::error::{OverxrptError, Result};
use crate::types::BoundaryPolicy;
use std::path::{Path, PathBuf};

/// Default report provider named in the email subject and body
pub const DEFAULT_PROVIDER: &str = "Landauer";

/// Settings for one analysis run
///
/// Everything the run depends on besides the report itself is passed in
/// here; nothing is read from the environment.
///
/// # Example
///
/// ```
/// use overxrpt_core::{BoundaryPolicy, RunConfig};
///
/// let config = RunConfig::default()
///     .with_levels("levels.xlsx")
///     .with_signature("Alex")
///     .with_boundary(BoundaryPolicy::Exclusive);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.provider, "Landauer");
/// assert!(config.use_history);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct RunConfig {
    /// Investigation levels workbook
    pub levels: Option<PathBuf>,

    /// Account code, instead of reading it from the report file name
    pub account: Option<String>,

    /// Subaccount code, instead of reading it from the report file name
    pub subaccount: Option<String>,

    /// Read earlier reports to recognise already-notified exceedances
    pub use_history: bool,

    /// Folder of earlier reports, defaults to the report's folder
    pub history_dir: Option<PathBuf>,

    /// Formal investigation template attached for new annual exceedances
    pub template: Option<PathBuf>,

    /// Name signing the email
    pub signature: Option<String>,

    /// Mailbox the email is sent on behalf of
    pub sender: Option<String>,

    /// Report provider named in the email
    pub provider: String,

    /// Treatment of a dose exactly at a level
    pub boundary: BoundaryPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            levels: None,
            account: None,
            subaccount: None,
            use_history: true,
            history_dir: None,
            template: None,
            signature: None,
            sender: None,
            provider: DEFAULT_PROVIDER.to_string(),
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Loads settings from a JSON file
    ///
    /// Relative paths in the file are taken relative to the file's folder.
    #[cfg(feature = "json")]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: RunConfig = serde_json::from_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.levels = config.levels.map(|p| relative_to(base, p));
        config.template = config.template.map(|p| relative_to(base, p));
        config.history_dir = config.history_dir.map(|p| relative_to(base, p));

        Ok(config)
    }

    /// Builder: Set the levels workbook
    pub fn with_levels(mut self, path: impl Into<PathBuf>) -> Self {
        self.levels = Some(path.into());
        self
    }

    /// Builder: Set the account code
    pub fn with_account(mut self, code: impl Into<String>) -> Self {
        self.account = Some(code.into());
        self
    }

    /// Builder: Set the subaccount code
    pub fn with_subaccount(mut self, code: impl Into<String>) -> Self {
        self.subaccount = Some(code.into());
        self
    }

    /// Builder: Enable or disable reading earlier reports
    ///
    /// # Example
    ///
    /// ```
    /// use overxrpt_core::RunConfig;
    ///
    /// let config = RunConfig::default().use_history(false);
    /// assert!(!config.use_history);
    /// ```
    pub fn use_history(mut self, enabled: bool) -> Self {
        self.use_history = enabled;
        self
    }

    /// Builder: Set the folder of earlier reports
    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = Some(dir.into());
        self
    }

    /// Builder: Set the investigation template
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Builder: Set the email signature
    pub fn with_signature(mut self, name: impl Into<String>) -> Self {
        self.signature = Some(name.into());
        self
    }

    /// Builder: Set the sending mailbox
    pub fn with_sender(mut self, address: impl Into<String>) -> Self {
        self.sender = Some(address.into());
        self
    }

    /// Builder: Set the report provider name
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Builder: Set the boundary policy
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Levels workbook path
    ///
    /// # Errors
    ///
    /// Returns [`OverxrptError::Config`] if no workbook was given.
    pub fn levels_path(&self) -> Result<&Path> {
        self.levels
            .as_deref()
            .ok_or_else(|| OverxrptError::Config("no investigation levels workbook given".into()))
    }

    /// Checks that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        self.levels_path()?;
        if self.provider.trim().is_empty() {
            return Err(OverxrptError::Config("report provider name is empty".into()));
        }
        if let Some(sender) = &self.sender {
            if !sender.contains('@') {
                return Err(OverxrptError::Config(format!(
                    "sender '{}' is not an email address",
                    sender
                )));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "json")]
fn relative_to(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
