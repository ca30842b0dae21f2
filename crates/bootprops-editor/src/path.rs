//! Property paths and the path resolver.

use crate::outline::Outline;
use serde::Serialize;
use std::fmt;

/// One step of a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key. May itself contain dots (`com.acme` in
    /// `logging.level.com.acme`).
    Key(String),
    /// Position in a sequence.
    Index(usize),
}

/// The property path implied by a location in a document.
///
/// Rendered with dots between keys and brackets around indices:
/// `volder.foo.list[0].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    /// The path of the first `len` segments.
    pub fn prefix(&self, len: usize) -> PropertyPath {
        PropertyPath {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Keys split at their dots, indices kept as they are.
    ///
    /// `a.b` written as one key and `a:\n  b:` written as two keys denote the
    /// same property; comparing flattened paths treats them alike.
    pub fn flattened(&self) -> Vec<PathSegment> {
        self.segments
            .iter()
            .flat_map(|segment| match segment {
                PathSegment::Key(key) => key
                    .split('.')
                    .map(|part| PathSegment::Key(part.to_string()))
                    .collect::<Vec<_>>(),
                PathSegment::Index(i) => vec![PathSegment::Index(*i)],
            })
            .collect()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// The property path at `offset` in `text`.
///
/// Offsets on a key, on its value or on a continuation line of the value all
/// resolve to the path of that key. Offsets in comments, on blank lines, or
/// outside the document resolve to `None`.
///
/// Works on any text, including text that is not valid YAML.
pub fn path_at(text: &str, offset: usize) -> Option<PropertyPath> {
    if !text.is_char_boundary(offset) {
        return None;
    }
    let outline = Outline::new(text);
    let located = outline.locate(offset)?;
    let path = outline.path(located.node);
    (!path.is_empty()).then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_at_marker(marked: &str, marker: &str) -> Option<String> {
        let offset = marked.find(marker).unwrap();
        path_at(marked, offset).map(|p| p.to_string())
    }

    #[test]
    fn test_display() {
        let path = PropertyPath::new()
            .key("volder")
            .key("foo")
            .key("list")
            .index(0)
            .key("name");
        assert_eq!(path.to_string(), "volder.foo.list[0].name");
        assert_eq!(PropertyPath::new().to_string(), "");
    }

    #[test]
    fn test_flattened() {
        let path = PropertyPath::new().key("logging").key("level.com.acme");
        assert_eq!(path.flattened().len(), 4);
    }

    #[test]
    fn test_path_on_keys_and_values() {
        let text = "spring:\n  application:\n    name: foofoo\nserver:\n  port: 8888\n";
        assert_eq!(
            path_at_marker(text, "name").as_deref(),
            Some("spring.application.name")
        );
        assert_eq!(
            path_at_marker(text, "foofoo").as_deref(),
            Some("spring.application.name")
        );
        assert_eq!(path_at_marker(text, "8888").as_deref(), Some("server.port"));
        assert_eq!(path_at_marker(text, "server").as_deref(), Some("server"));
    }

    #[test]
    fn test_path_on_continuation_line() {
        let text = "server:\n  port:\n    8888\n";
        assert_eq!(path_at_marker(text, "8888").as_deref(), Some("server.port"));
    }

    #[test]
    fn test_sequence_items_contribute_indices() {
        let text = "volder:\n  list:\n    - name: Kris\n    - name: Other\n      roles:\n        - Admin\n";
        assert_eq!(
            path_at_marker(text, "Other").as_deref(),
            Some("volder.list[1].name")
        );
        assert_eq!(
            path_at_marker(text, "Admin").as_deref(),
            Some("volder.list[1].roles[0]")
        );
    }

    #[test]
    fn test_no_path_in_comments() {
        let text = "# server port\nserver:\n  port: 80 # the port\n";
        assert_eq!(path_at_marker(text, "port"), None);
        assert_eq!(path_at_marker(text, "the"), None);
        assert!(path_at_marker(text, "80").is_some());
    }

    #[test]
    fn test_path_in_unparseable_text() {
        let text = "server:\n  port: \"open\n  address: x\n";
        assert_eq!(
            path_at_marker(text, "address").as_deref(),
            Some("server.address")
        );
    }
}
