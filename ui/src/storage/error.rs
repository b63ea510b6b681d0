use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
