pub mod api;
pub mod cli;
pub mod comparator;
pub mod config;
pub mod email;
pub mod error;
pub mod history;
pub mod levels;
pub mod report;
pub mod resolver;
pub mod types;
pub mod workbook;

pub use api::{OverexposureAnalyser, OverexposureAnalysis};
pub use cli::report::TextReport;
pub use comparator::{classify, Comparator, ComparisonResult};
pub use config::RunConfig;
pub use email::{EmailComposer, EmailDraft};
pub use error::{OverxrptError, Result};
pub use history::NotificationHistory;
pub use levels::{AccountLevels, Levels, LevelsTable, ThresholdEntry};
pub use report::{Report, ReportCodes, ReportRow};
pub use resolver::{resolve, ResolvedRow};
pub use types::*;
pub use workbook::{SheetGrid, Workbook};
