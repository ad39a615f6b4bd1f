use thiserror::Error;

/// Result type for overxrpt operations
pub type Result<T> = std::result::Result<T, OverxrptError>;

/// Error types for overxrpt operations
#[derive(Error, Debug)]
pub enum OverxrptError {
    /// Spreadsheet could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Input file does not have the expected layout
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Threshold entry, sheet or level column missing or ambiguous
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Cell value could not be interpreted
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Badge use not covered by the investigation levels
    #[error("Badge type not implemented: {0}")]
    UnsupportedBadge(String),

    /// Run configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for OverxrptError {
    fn from(s: String) -> Self {
        OverxrptError::InvalidValue(s)
    }
}

impl From<&str> for OverxrptError {
    fn from(s: &str) -> Self {
        OverxrptError::InvalidValue(s.to_string())
    }
}

// Convert calamine errors
impl From<calamine::Error> for OverxrptError {
    fn from(e: calamine::Error) -> Self {
        OverxrptError::Workbook(format!("{}", e))
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for OverxrptError {
    fn from(e: serde_json::Error) -> Self {
        OverxrptError::Config(format!("{}", e))
    }
}
