use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A token that is present but cannot be read.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a json object: {0}")]
    Json(#[from] serde_json::Error),
}
