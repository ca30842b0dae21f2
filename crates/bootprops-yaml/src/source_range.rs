//! Source ranges for YAML nodes.

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the parsed text.
///
/// Offsets are byte offsets into the UTF-8 source, so a range can be used to
/// slice the original `&str` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    /// Byte offset of the first character (inclusive).
    pub start: usize,
    /// Byte offset just past the last character (exclusive).
    pub end: usize,
}

impl SourceRange {
    /// Create a range spanning `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    /// Create a zero-width range at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if this range is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether a cursor offset touches this range.
    ///
    /// Both ends are inclusive: a cursor placed right after the last
    /// character of a key still belongs to that key.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Check whether `other` lies entirely within this range.
    pub fn encloses(&self, other: &SourceRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest range covering both `self` and `other`.
    pub fn cover(&self, other: &SourceRange) -> SourceRange {
        SourceRange::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The text this range covers. Out-of-bounds ranges yield `""`.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

impl From<std::ops::Range<usize>> for SourceRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        SourceRange::new(range.start, range.end)
    }
}

impl From<SourceRange> for std::ops::Range<usize> {
    fn from(range: SourceRange) -> Self {
        range.start..range.end
    }
}

/// Maps yaml-rust2 character indices onto byte offsets.
///
/// The scanner counts characters, the rest of the workspace works with byte
/// offsets. For pure ASCII input the mapping is the identity and no table is
/// built.
#[derive(Debug, Clone)]
pub(crate) struct OffsetMap {
    /// `byte_of[i]` is the byte offset of character `i`; the final entry is
    /// the text length. Empty when the text is ASCII.
    byte_of: Vec<usize>,
    len: usize,
}

impl OffsetMap {
    pub(crate) fn new(text: &str) -> Self {
        let byte_of = if text.is_ascii() {
            Vec::new()
        } else {
            text.char_indices()
                .map(|(offset, _)| offset)
                .chain(std::iter::once(text.len()))
                .collect()
        };
        Self {
            byte_of,
            len: text.len(),
        }
    }

    /// Byte offset of the character at `char_index`, clamped to the text end.
    pub(crate) fn byte_offset(&self, char_index: usize) -> usize {
        if self.byte_of.is_empty() {
            char_index.min(self.len)
        } else {
            self.byte_of
                .get(char_index)
                .copied()
                .unwrap_or(self.len)
        }
    }
}
