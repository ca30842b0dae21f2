//! Text edits and their application.

use crate::error::{EditorError, Result};
use bootprops_yaml::SourceRange;
use serde::Serialize;

/// Replace the text in `range` by `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: SourceRange,
    pub text: String,
}

impl TextEdit {
    pub fn new(range: SourceRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(SourceRange::point(offset), text)
    }

    pub fn delete(range: SourceRange) -> Self {
        Self::new(range, "")
    }

    /// An edit that leaves the document unchanged.
    pub fn is_noop(&self) -> bool {
        self.range.is_empty() && self.text.is_empty()
    }

    /// Change in document length caused by this edit.
    fn delta(&self) -> isize {
        self.text.len() as isize - self.range.len() as isize
    }
}

/// Apply non-overlapping `edits` to `text`.
///
/// Edit ranges refer to the original text. An insertion and a replacement
/// starting at the same offset are allowed; the inserted text ends up first.
///
/// # Errors
///
/// Fails when an edit range is outside the text or splits a UTF-8 sequence,
/// or when two edits overlap.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String> {
    let mut sorted: Vec<&TextEdit> = edits.iter().filter(|edit| !edit.is_noop()).collect();
    sorted.sort_by_key(|edit| (edit.range.start, edit.range.end));

    for pair in sorted.windows(2) {
        if pair[0].range.end > pair[1].range.start {
            return Err(EditorError::OverlappingEdits {
                first: pair[0].range,
                second: pair[1].range,
            });
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for edit in sorted {
        let before = text
            .get(copied..edit.range.start)
            .ok_or(EditorError::InvalidOffset {
                offset: edit.range.start,
                len: text.len(),
            })?;
        if !text.is_char_boundary(edit.range.end) {
            return Err(EditorError::InvalidOffset {
                offset: edit.range.end,
                len: text.len(),
            });
        }
        out.push_str(before);
        out.push_str(&edit.text);
        copied = edit.range.end;
    }
    out.push_str(&text[copied..]);
    Ok(out)
}

/// Where `offset` of the original text ends up once `edits` are applied.
///
/// Offsets inside a replaced range move to the start of its replacement.
pub fn map_offset(edits: &[TextEdit], offset: usize) -> usize {
    let mut mapped = offset as isize;
    for edit in edits {
        if edit.range.end <= offset && !edit.range.is_empty() {
            mapped += edit.delta();
        } else if edit.range.is_empty() && edit.range.start < offset {
            mapped += edit.delta();
        } else if edit.range.start < offset && offset < edit.range.end {
            mapped -= (offset - edit.range.start) as isize;
        }
    }
    mapped.max(0) as usize
}

/// Offset, in the edited text, of position `within` of the text inserted by
/// `edits[anchor]`.
pub(crate) fn offset_in_edit(edits: &[TextEdit], anchor: usize, within: usize) -> usize {
    let start = edits[anchor].range.start;
    let shift: isize = edits
        .iter()
        .enumerate()
        .filter(|(i, edit)| *i != anchor && edit.range.end <= start && edit.range.start < start)
        .map(|(_, edit)| edit.delta())
        .sum();
    (start as isize + shift).max(0) as usize + within
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_any_order() {
        let edits = vec![
            TextEdit::insert(0, ">> "),
            TextEdit::new(SourceRange::new(6, 11), "there"),
        ];
        assert_eq!(apply_edits("hello world", &edits).unwrap(), ">> hello there");
    }

    #[test]
    fn test_insert_before_delete_at_same_offset() {
        let edits = vec![
            TextEdit::delete(SourceRange::new(4, 6)),
            TextEdit::insert(4, "new\n"),
        ];
        assert_eq!(apply_edits("old\npo", &edits).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_overlap_rejected() {
        let edits = vec![
            TextEdit::delete(SourceRange::new(0, 4)),
            TextEdit::delete(SourceRange::new(2, 6)),
        ];
        assert!(matches!(
            apply_edits("abcdefgh", &edits),
            Err(EditorError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let edits = vec![TextEdit::insert(20, "x")];
        assert!(apply_edits("short", &edits).is_err());
    }

    #[test]
    fn test_map_offset() {
        let edits = vec![
            TextEdit::insert(2, "xyz"),
            TextEdit::delete(SourceRange::new(5, 8)),
        ];
        assert_eq!(map_offset(&edits, 0), 0);
        assert_eq!(map_offset(&edits, 4), 7);
        assert_eq!(map_offset(&edits, 6), 8);
        assert_eq!(map_offset(&edits, 9), 9);
    }

    #[test]
    fn test_offset_in_edit() {
        let edits = vec![
            TextEdit::delete(SourceRange::new(0, 3)),
            TextEdit::insert(10, "abc"),
        ];
        assert_eq!(offset_in_edit(&edits, 1, 2), 9);
    }
}
