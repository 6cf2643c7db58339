use thiserror::Error;

/// Errors raised while loading records or settings from disk.
///
/// The statistics and grouping code never fails; only the I/O edge does.
#[derive(Error, Debug)]
pub enum DiagplotError {
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read Excel file: {0}")]
    Excel(String),

    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("No data found: {0}")]
    NoData(String),

    #[error("Missing value column '{0}'")]
    MissingValueColumn(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<calamine::Error> for DiagplotError {
    fn from(e: calamine::Error) -> Self {
        DiagplotError::Excel(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiagplotError>;
