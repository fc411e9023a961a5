use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("client error: {0}")]
    Client(#[from] client::ClientError),
    #[error("storage error: {0}")]
    Storage(#[from] client::StorageError),
    #[error("export error: {0}")]
    Export(#[from] formatting::ExportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
