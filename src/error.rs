use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a CRM fetch. `fetch_or_empty` downgrades it to a warning.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("export file not found: {0}")]
    MissingExport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("--start and --end must be given together (got start={start:?}, end={end:?})")]
    IncompleteRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;
