//! Result types produced by editor requests.
//!
//! All of these are plain data, serializable to JSON for front ends. Offsets
//! are byte offsets into the document text the request was made against.

use crate::edit::{TextEdit, apply_edits};
use crate::error::Result;
use bootprops_yaml::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    /// The problem is not reported at all.
    Ignore,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Ignore => "ignore",
        })
    }
}

/// Category of a reconcile problem. Severities are configured per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemType {
    YamlSyntaxError,
    UnknownProperty,
    TypeMismatch,
    /// A node of the wrong kind: a non-scalar key, or a scalar or sequence
    /// where a mapping was expected.
    UnexpectedNode,
    Deprecated,
}

impl ProblemType {
    pub const ALL: [ProblemType; 5] = [
        ProblemType::YamlSyntaxError,
        ProblemType::UnknownProperty,
        ProblemType::TypeMismatch,
        ProblemType::UnexpectedNode,
        ProblemType::Deprecated,
    ];

    pub fn default_severity(self) -> Severity {
        match self {
            ProblemType::Deprecated => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable code shown next to messages.
    pub fn code(self) -> &'static str {
        match self {
            ProblemType::YamlSyntaxError => "yaml-syntax-error",
            ProblemType::UnknownProperty => "unknown-property",
            ProblemType::TypeMismatch => "type-mismatch",
            ProblemType::UnexpectedNode => "unexpected-node",
            ProblemType::Deprecated => "deprecated",
        }
    }
}

/// A problem found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: SourceRange,
    pub severity: Severity,
    pub message: String,
    pub problem: ProblemType,
}

impl Diagnostic {
    /// Create a diagnostic with the problem type's default severity.
    pub fn new(problem: ProblemType, range: SourceRange, message: impl Into<String>) -> Self {
        Self {
            range,
            severity: problem.default_severity(),
            message: message.into(),
            problem,
        }
    }
}

/// What a completion proposal inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    /// A property from the metadata index.
    Property,
    /// A property of a bean-typed value.
    BeanProperty,
    /// A value for the property under the cursor.
    Value,
}

/// A completion offered at the cursor.
///
/// Applying [`CompletionProposal::edits`] to the document and placing the
/// cursor at [`CompletionProposal::cursor`] performs the completion. Most
/// proposals are a single edit at the cursor; proposals that reuse an
/// existing mapping elsewhere in the document carry a second edit there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionProposal {
    /// Text shown in the completion list (e.g. `server.port`).
    pub label: String,
    pub kind: ProposalKind,
    /// Declared type of the proposed property, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub edits: Vec<TextEdit>,
    /// Cursor offset in the document once the edits are applied.
    pub cursor: usize,
    /// Ranking score; higher is better.
    pub score: f64,
}

impl CompletionProposal {
    /// The edit that carries the inserted text. Empty for proposals that only
    /// move the cursor.
    pub fn primary_edit(&self) -> Option<&TextEdit> {
        self.edits
            .iter()
            .find(|edit| !edit.text.is_empty())
            .or_else(|| self.edits.first())
    }

    /// Insertion range of the primary edit.
    pub fn range(&self) -> Option<SourceRange> {
        self.primary_edit().map(|edit| edit.range)
    }

    /// Replacement text of the primary edit.
    pub fn replacement(&self) -> &str {
        self.primary_edit().map_or("", |edit| edit.text.as_str())
    }

    /// Apply the proposal to `text`, returning the new text and the cursor.
    ///
    /// # Errors
    ///
    /// Fails if `text` is not the document the proposal was computed for.
    pub fn apply(&self, text: &str) -> Result<(String, usize)> {
        Ok((apply_edits(text, &self.edits)?, self.cursor))
    }
}

/// Hover information for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverInfo {
    /// The hovered key or value.
    pub range: SourceRange,
    /// Property path the hover describes.
    pub path: String,
    /// HTML rendering of the property documentation.
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diagnostic_json() {
        let diagnostic = Diagnostic::new(
            ProblemType::UnknownProperty,
            SourceRange::new(0, 5),
            "Unknown property 'bogus'",
        );
        assert_eq!(
            serde_json::to_value(&diagnostic).unwrap(),
            json!({
                "range": { "start": 0, "end": 5 },
                "severity": "error",
                "message": "Unknown property 'bogus'",
                "problem": "unknown-property",
            })
        );
    }

    #[test]
    fn test_proposal_json_skips_missing_fields() {
        let proposal = CompletionProposal {
            label: "RED".into(),
            kind: ProposalKind::Value,
            type_name: None,
            description: None,
            edits: vec![TextEdit::insert(7, "RED")],
            cursor: 10,
            score: 1.0,
        };
        let value = serde_json::to_value(&proposal).unwrap();
        assert_eq!(value["kind"], "value");
        assert!(value.get("type_name").is_none());
        assert_eq!(proposal.replacement(), "RED");
        assert_eq!(proposal.apply("color: ").unwrap(), ("color: RED".to_string(), 10));
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(ProblemType::Deprecated.default_severity(), Severity::Warning);
        assert_eq!(ProblemType::TypeMismatch.default_severity(), Severity::Error);
        assert_eq!(Severity::Ignore.to_string(), "ignore");
    }
}
