//! Editor settings.
//!
//! Settings are read from TOML:
//!
//! ```toml
//! indent = 2
//!
//! [severity]
//! unknown-property = "warning"
//! deprecated = "ignore"
//! ```
//!
//! Every field is optional; missing values keep their defaults.

use crate::completion::DEFAULT_INDENT;
use crate::error::Result;
use crate::types::{ProblemType, Severity};
use serde::Deserialize;

/// Settings applied to every request of a [`crate::YamlEditor`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorSettings {
    /// Indentation width used for keys synthesized by completions.
    pub indent: usize,
    /// Severity overrides per problem type.
    pub severity: SeverityOverrides,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            severity: SeverityOverrides::default(),
        }
    }
}

/// The `[severity]` table. Unset entries use
/// [`ProblemType::default_severity`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SeverityOverrides {
    pub yaml_syntax_error: Option<Severity>,
    pub unknown_property: Option<Severity>,
    pub type_mismatch: Option<Severity>,
    pub unexpected_node: Option<Severity>,
    pub deprecated: Option<Severity>,
}

impl SeverityOverrides {
    fn slot(&mut self, problem: ProblemType) -> &mut Option<Severity> {
        match problem {
            ProblemType::YamlSyntaxError => &mut self.yaml_syntax_error,
            ProblemType::UnknownProperty => &mut self.unknown_property,
            ProblemType::TypeMismatch => &mut self.type_mismatch,
            ProblemType::UnexpectedNode => &mut self.unexpected_node,
            ProblemType::Deprecated => &mut self.deprecated,
        }
    }

    fn get(&self, problem: ProblemType) -> Option<Severity> {
        match problem {
            ProblemType::YamlSyntaxError => self.yaml_syntax_error,
            ProblemType::UnknownProperty => self.unknown_property,
            ProblemType::TypeMismatch => self.type_mismatch,
            ProblemType::UnexpectedNode => self.unexpected_node,
            ProblemType::Deprecated => self.deprecated,
        }
    }
}

impl EditorSettings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Settings`] for malformed TOML, unknown
    /// keys or unknown problem types.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: EditorSettings = toml::from_str(text)?;
        Ok(settings.normalized())
    }

    /// Effective severity of a problem type.
    pub fn severity_of(&self, problem: ProblemType) -> Severity {
        self.severity
            .get(problem)
            .unwrap_or_else(|| problem.default_severity())
    }

    pub fn with_severity(mut self, problem: ProblemType, severity: Severity) -> Self {
        *self.severity.slot(problem) = Some(severity);
        self
    }

    fn normalized(mut self) -> Self {
        if self.indent == 0 {
            self.indent = DEFAULT_INDENT;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::from_toml("").unwrap();
        assert_eq!(settings, EditorSettings::default());
        assert_eq!(
            settings.severity_of(ProblemType::UnknownProperty),
            Severity::Error
        );
        assert_eq!(
            settings.severity_of(ProblemType::Deprecated),
            Severity::Warning
        );
    }

    #[test]
    fn test_overrides() {
        let settings = EditorSettings::from_toml(
            "indent = 4\n[severity]\nunknown-property = \"warning\"\ndeprecated = \"ignore\"\n",
        )
        .unwrap();
        assert_eq!(settings.indent, 4);
        assert_eq!(
            settings.severity_of(ProblemType::UnknownProperty),
            Severity::Warning
        );
        assert_eq!(settings.severity_of(ProblemType::Deprecated), Severity::Ignore);
        assert_eq!(settings.severity_of(ProblemType::TypeMismatch), Severity::Error);
    }

    #[test]
    fn test_zero_indent_falls_back() {
        assert_eq!(EditorSettings::from_toml("indent = 0").unwrap().indent, 2);
    }

    #[test]
    fn test_with_severity_covers_every_problem() {
        for problem in ProblemType::ALL {
            let settings = EditorSettings::default().with_severity(problem, Severity::Ignore);
            assert_eq!(settings.severity_of(problem), Severity::Ignore);
        }
    }

    #[test]
    fn test_rejects_unknown_problem_type() {
        assert!(EditorSettings::from_toml("[severity]\nbogus = \"error\"").is_err());
        assert!(EditorSettings::from_toml("colour = 1").is_err());
    }
}
