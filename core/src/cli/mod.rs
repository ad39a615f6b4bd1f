pub mod report;

use crate::config::RunConfig;
use crate::error::Result;
use crate::types::BoundaryPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for overxrpt
#[derive(Parser, Debug)]
#[command(name = "overxrpt")]
#[command(about = "Overexposure report analyser: checks dosimetry alerts against investigation levels and drafts the notification email")]
#[command(version)]
pub struct Cli {
    /// Overexposure report export (name carries _AC<account> and _SUB<subaccount>)
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// Investigation levels workbook
    #[arg(short, long, value_name = "WORKBOOK")]
    pub levels: Option<PathBuf>,

    /// Account code, instead of reading it from the report name
    #[arg(long, value_name = "CODE")]
    pub account: Option<String>,

    /// Subaccount code, instead of reading it from the report name
    #[arg(long, value_name = "CODE")]
    pub subaccount: Option<String>,

    /// Folder of earlier reports (default: the report's folder)
    #[arg(long, value_name = "DIR", conflicts_with = "no_history")]
    pub history_dir: Option<PathBuf>,

    /// Do not look at earlier reports
    #[arg(long)]
    pub no_history: bool,

    /// Formal investigation template to attach for new annual exceedances
    #[arg(short, long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Name signing the email
    #[arg(short, long, value_name = "NAME")]
    pub signature: Option<String>,

    /// Mailbox the email is sent on behalf of
    #[arg(long, value_name = "ADDRESS")]
    pub sender: Option<String>,

    /// Treatment of a dose exactly at a level
    #[arg(short, long)]
    pub boundary: Option<BoundaryArg>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the draft to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a table of all results to stderr
    #[arg(long)]
    pub summary: bool,

    /// JSON settings file; command-line options take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the run configuration from the settings file and options
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(levels) = &self.levels {
            config = config.with_levels(levels);
        }
        if let Some(account) = &self.account {
            config = config.with_account(account);
        }
        if let Some(subaccount) = &self.subaccount {
            config = config.with_subaccount(subaccount);
        }
        if let Some(dir) = &self.history_dir {
            config = config.with_history_dir(dir);
        }
        if self.no_history {
            config = config.use_history(false);
        }
        if let Some(template) = &self.template {
            config = config.with_template(template);
        }
        if let Some(signature) = &self.signature {
            config = config.with_signature(signature);
        }
        if let Some(sender) = &self.sender {
            config = config.with_sender(sender);
        }
        if let Some(boundary) = &self.boundary {
            config = config.with_boundary(boundary.clone().into());
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "json")]
fn load_config_file(path: &std::path::Path) -> Result<RunConfig> {
    RunConfig::from_json_file(path)
}

#[cfg(not(feature = "json"))]
fn load_config_file(_path: &std::path::Path) -> Result<RunConfig> {
    Err(crate::error::OverxrptError::Config(
        "settings files require the 'json' feature".into(),
    ))
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text email with header lines
    Text,
    /// HTML email body
    Html,
    /// JSON format
    Json,
}

/// Boundary policy options
#[derive(Debug, Clone, ValueEnum)]
pub enum BoundaryArg {
    /// A dose equal to the level requires investigation
    Inclusive,
    /// Only a dose above the level requires investigation
    Exclusive,
}

impl From<BoundaryArg> for BoundaryPolicy {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Inclusive => BoundaryPolicy::Inclusive,
            BoundaryArg::Exclusive => BoundaryPolicy::Exclusive,
        }
    }
}
