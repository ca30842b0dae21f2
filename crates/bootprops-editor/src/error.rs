//! Error types for editor operations.

use bootprops_yaml::SourceRange;
use thiserror::Error;

/// Result type alias for bootprops-editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors raised by editor requests.
///
/// Problems *in* the edited document are never errors; they are reported as
/// [`crate::Diagnostic`]s. These variants cover misuse of the API.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A cursor offset beyond the end of the document or inside a UTF-8
    /// sequence.
    #[error("offset {offset} is not a valid position in a document of {len} bytes")]
    InvalidOffset { offset: usize, len: usize },

    /// Two edits of one change touch the same text.
    #[error("overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        first: SourceRange,
        second: SourceRange,
    },

    /// The editor settings file could not be read.
    #[error("invalid editor settings: {0}")]
    Settings(#[from] toml::de::Error),
}

/// Check that `offset` is a char boundary of `text`.
pub(crate) fn check_offset(text: &str, offset: usize) -> Result<()> {
    if text.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(EditorError::InvalidOffset {
            offset,
            len: text.len(),
        })
    }
}
