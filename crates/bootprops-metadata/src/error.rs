//! Error types for metadata loading.

use thiserror::Error;

/// Result type alias for bootprops-metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading metadata or type descriptions.
#[derive(Debug, Error)]
pub enum Error {
    /// The metadata or type document is not valid JSON of the expected shape.
    #[error("invalid metadata document: {0}")]
    Json(#[from] serde_json::Error),

    /// A declared type name could not be parsed.
    #[error("malformed type name '{name}': {reason}")]
    TypeSyntax { name: String, reason: String },
}
