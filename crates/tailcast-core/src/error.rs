use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailcastError {
    #[error("config error: {0}")]
    Config(String),

    #[cfg(feature = "native")]
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("unexpected document shape: {0}")]
    Shape(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
