//! Property metadata records.

use serde::{Deserialize, Serialize};

/// Deprecation details attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub replacement: Option<String>,
}

/// A suggested value for a property, taken from the metadata `hints` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueHint {
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

impl ValueHint {
    /// The value as it would be typed in a YAML document.
    pub fn text(&self) -> String {
        json_to_text(&self.value)
    }
}

/// A configuration property as described by the metadata index.
///
/// Field names follow the configuration-metadata JSON format, so a record
/// can be deserialized straight from an entry of its `properties` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    /// Dotted property path, e.g. `server.port`.
    #[serde(rename = "name")]
    pub path: String,

    /// Declared type, e.g. `java.util.Map<java.lang.String,java.lang.String>`.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,

    #[serde(default)]
    pub default_value: Option<serde_json::Value>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub deprecation: Option<Deprecation>,

    /// Class declaring the property.
    #[serde(default)]
    pub source_type: Option<String>,

    /// Factory method the property was bound through, e.g. `hikariDataSource()`.
    #[serde(default)]
    pub source_method: Option<String>,

    /// Setter (or factory method) references the property binds to.
    ///
    /// Filled from `source_type` / `source_method` when the index is built,
    /// unless given explicitly.
    #[serde(default)]
    pub targets: Vec<String>,

    #[serde(default)]
    pub hints: Vec<ValueHint>,
}

impl PropertyMetadata {
    /// Create a record with just a path, a type and a description.
    pub fn new(
        path: impl Into<String>,
        type_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            type_name: Some(type_name.into()),
            default_value: None,
            description: Some(description.into()),
            deprecated: false,
            deprecation: None,
            source_type: None,
            source_method: None,
            targets: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated || self.deprecation.is_some()
    }

    /// The default value rendered as text, if any.
    pub fn default_text(&self) -> Option<String> {
        self.default_value.as_ref().map(json_to_text)
    }

    /// Last dotted segment of the path.
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Setter reference derived from the declaring type, e.g.
    /// `org.acme.ServerProperties.setPort(Integer)`.
    pub(crate) fn derived_target(&self) -> Option<String> {
        let source_type = self.source_type.as_deref()?;
        if let Some(method) = &self.source_method {
            return Some(format!("{source_type}.{method}"));
        }
        let argument = self
            .type_name
            .as_deref()
            .map(simple_type_name)
            .unwrap_or_default();
        Some(format!(
            "{source_type}.set{}({argument})",
            camel_case(self.simple_name(), true)
        ))
    }
}

/// Render a JSON value the way it would be typed in YAML.
fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(json_to_text)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Strip package qualifiers, including inside type arguments:
/// `java.util.List<java.lang.String>` becomes `List<String>`.
fn simple_type_name(type_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len());
    let mut segment = String::new();
    for c in type_name.chars() {
        match c {
            '.' => segment.clear(),
            '<' | '>' | ',' | '[' | ']' | ' ' => {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(&segment);
    out
}

/// Convert a kebab/snake name to camel case: `login-timeout` to
/// `loginTimeout` (or `LoginTimeout` when `upper_first`).
pub fn camel_case(name: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = upper_first;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a camel-case name to kebab case: `initSqls` to `init-sqls`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

/// Relaxed-binding form of a name: lowercase, separators removed.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
