use thiserror::Error;

/// Error taxonomy shared by every layer. Callers map these to transport
/// responses at the boundary; the core never recovers silently.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or invalid caller input (empty chat history, empty chunk set,
    /// missing username).
    #[error("validation error: {0}")]
    Validation(String),

    /// No index, user or template exists for the given key.
    #[error("not found: {0}")]
    NotFound(String),

    /// Embedding or language-model provider failure.
    #[error("upstream provider error: {0}")]
    Upstream(String),

    /// Persistence layer failure.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl From<dialoguer::Error> for CoreError {
    fn from(err: dialoguer::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
