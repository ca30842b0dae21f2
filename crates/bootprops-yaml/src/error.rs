//! Error types for YAML parsing with source locations.

use crate::SourceRange;
use thiserror::Error;

/// Result type alias for bootprops-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during YAML parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The scanner or parser rejected the text.
    ///
    /// `message` is the parser's own wording (for example
    /// `"while scanning a quoted scalar, found unexpected end of stream"`).
    #[error("{message} (line {line}, column {column})")]
    Syntax {
        message: String,
        /// Byte offset where the parser gave up.
        offset: usize,
        /// 1-based line of `offset`.
        line: usize,
        /// 1-based column of `offset`.
        column: usize,
    },
}

impl Error {
    /// The parser message without location decoration.
    pub fn message(&self) -> &str {
        match self {
            Error::Syntax { message, .. } => message,
        }
    }

    /// Zero-width range at the failure location.
    pub fn range(&self) -> SourceRange {
        match self {
            Error::Syntax { offset, .. } => SourceRange::point(*offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = Error::Syntax {
            message: "did not find expected key".into(),
            offset: 13,
            line: 2,
            column: 1,
        };
        assert_eq!(err.to_string(), "did not find expected key (line 2, column 1)");
        assert_eq!(err.message(), "did not find expected key");
        assert_eq!(err.range(), SourceRange::point(13));
    }
}
