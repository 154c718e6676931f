use ned_core::NedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] NedError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A telemetry log line that could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Malformed message id: {0:?}")]
    BadTag(String),

    #[error("Expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid number in field {field}: {value:?}")]
    InvalidNumber { field: usize, value: String },

    #[error("Non-finite value in field {field}")]
    NonFinite { field: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("No home position before end of log, {pending} points left unconverted")]
    MissingHome { pending: usize },
}

pub type Result<T> = std::result::Result<T, IoError>;
