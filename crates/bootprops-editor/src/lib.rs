//! # bootprops-editor
//!
//! Editor intelligence for YAML configuration files: validation
//! ("reconcile"), content assist, hover documentation and navigation, all
//! driven by a [`PropertyIndex`] and a [`TypeCatalog`].
//!
//! Every request takes the full document text and a byte offset and builds
//! what it needs from scratch; nothing is cached between requests.
//!
//! ```text
//!            text + offset
//!                 │
//!     ┌───────────┴────────────┐
//!     ▼                        ▼
//! bootprops-yaml           outline (tolerant,
//! (strict parse)           indentation based)
//!     │                        │
//!     ▼                        ▼
//! reconcile            path / completion / hover
//!     │                        │
//!     └──────► index + types ◄─┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bootprops_editor::YamlEditor;
//! use bootprops_metadata::{EmptyCatalog, MetadataIndex, PropertyMetadata};
//!
//! let index = MetadataIndex::new()
//!     .with(PropertyMetadata::new("server.port", "java.lang.Integer", "Server HTTP port"));
//! let editor = YamlEditor::new(&index, &EmptyCatalog);
//!
//! let diagnostics = editor.reconcile("server:\n  port: eighty\n");
//! assert_eq!(diagnostics[0].message, "Expecting a 'Integer' but got 'eighty'");
//!
//! let proposals = editor.complete("port", 4).unwrap();
//! let (text, _cursor) = proposals[0].apply("port").unwrap();
//! assert_eq!(text, "server:\n  port: ");
//! ```

mod completion;
mod edit;
mod error;
mod fuzzy;
mod hover;
mod outline;
mod path;
mod reconcile;
mod resolve;
mod settings;
mod types;

pub use completion::complete;
pub use edit::{TextEdit, apply_edits, map_offset};
pub use error::{EditorError, Result};
pub use fuzzy::{MatchScore, MatchTier, QueryMatcher};
pub use hover::{hover, link_targets};
pub use path::{PathSegment, PropertyPath, path_at};
pub use reconcile::{is_placeholder, reconcile, reconcile_tree};
pub use settings::{EditorSettings, SeverityOverrides};
pub use types::{
    CompletionProposal, Diagnostic, HoverInfo, ProblemType, ProposalKind, Severity,
};

use bootprops_metadata::{PropertyIndex, TypeCatalog};
use completion::Completer;

/// An index, a type catalog and settings bundled for repeated requests.
///
/// The free functions ([`reconcile`], [`complete`], ...) use default
/// settings; the editor applies its [`EditorSettings`] on top of them.
#[derive(Clone, Copy)]
pub struct YamlEditor<'a> {
    index: &'a dyn PropertyIndex,
    types: &'a dyn TypeCatalog,
    settings: &'a EditorSettings,
}

static DEFAULT_SETTINGS: EditorSettings = EditorSettings {
    indent: completion::DEFAULT_INDENT,
    severity: SeverityOverrides {
        yaml_syntax_error: None,
        unknown_property: None,
        type_mismatch: None,
        unexpected_node: None,
        deprecated: None,
    },
};

impl<'a> YamlEditor<'a> {
    pub fn new(index: &'a dyn PropertyIndex, types: &'a dyn TypeCatalog) -> Self {
        Self {
            index,
            types,
            settings: &DEFAULT_SETTINGS,
        }
    }

    pub fn with_settings(mut self, settings: &'a EditorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EditorSettings {
        self.settings
    }

    /// Diagnostics for `text` with configured severities. Problems set to
    /// [`Severity::Ignore`] are left out.
    pub fn reconcile(&self, text: &str) -> Vec<Diagnostic> {
        self.with_severities(reconcile(text, self.index, self.types))
    }

    /// Like [`YamlEditor::reconcile`], for already parsed documents.
    pub fn reconcile_tree(&self, documents: &[bootprops_yaml::YamlNode]) -> Vec<Diagnostic> {
        self.with_severities(reconcile_tree(documents, self.index, self.types))
    }

    fn with_severities(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .filter_map(|mut diagnostic| {
                diagnostic.severity = self.settings.severity_of(diagnostic.problem);
                (diagnostic.severity != Severity::Ignore).then_some(diagnostic)
            })
            .collect()
    }

    /// Completion proposals at `offset`, best first.
    ///
    /// # Errors
    ///
    /// Fails if `offset` is not a position in `text`.
    pub fn complete(&self, text: &str, offset: usize) -> Result<Vec<CompletionProposal>> {
        Completer {
            index: self.index,
            types: self.types,
            indent: self.settings.indent,
        }
        .complete(text, offset)
    }

    /// # Errors
    ///
    /// Fails if `offset` is not a position in `text`.
    pub fn hover(&self, text: &str, offset: usize) -> Result<Option<HoverInfo>> {
        hover(text, offset, self.index)
    }

    /// # Errors
    ///
    /// Fails if `offset` is not a position in `text`.
    pub fn link_targets(&self, text: &str, offset: usize) -> Result<Vec<String>> {
        link_targets(text, offset, self.index)
    }

    pub fn path_at(&self, text: &str, offset: usize) -> Option<PropertyPath> {
        path_at(text, offset)
    }
}
