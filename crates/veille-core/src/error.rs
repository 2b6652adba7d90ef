use thiserror::Error;

/// Application-wide error types for veille.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page, or non-success status).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A CSS selector string failed to parse.
    #[error("Selector error: {0}")]
    SelectorError(String),

    /// A field-extraction pattern failed to compile.
    #[error("Pattern error: {0}")]
    PatternError(#[from] regex::Error),

    /// Categorization call failed.
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// Persistence collaborator rejected the write (e.g. duplicate url).
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration file could not be read or understood.
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if this error came from the fetch/transport layer.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_) | AppError::NetworkError(_) | AppError::Timeout(_)
        )
    }
}
