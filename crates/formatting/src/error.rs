use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected at least {expected} characters, got {found}")]
    TooShort { expected: usize, found: usize },
    #[error("invalid number in {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("date or time out of range")]
    OutOfRange,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of objects")]
    NotRecords,
}
