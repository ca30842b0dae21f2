//! Indentation-based outline of a YAML document.
//!
//! Completion runs on documents that are being typed and rarely parse. The
//! outline reads the text line by line and recovers the key structure from
//! indentation alone: every `key:` line and every `- ` sequence item becomes
//! a node, attached to the closest preceding node that is indented less.
//! Lines that are neither (scalar continuations, half-typed words) are owned
//! by the node they are indented under.
//!
//! The outline never fails. It is deliberately forgiving and does not try to
//! understand flow collections or multi-line quoted scalars.

use crate::path::{PathSegment, PropertyPath};
use bootprops_yaml::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    /// `---` or `...`.
    DocumentMarker,
    Content,
}

/// A physical line of the document.
#[derive(Debug, Clone)]
pub struct Line {
    /// The line without its line break.
    pub range: SourceRange,
    /// Offset just past the line break (or the end of the text).
    pub next_start: usize,
    /// Column of the first non-blank character.
    pub indent: usize,
    pub kind: LineKind,
    /// Start of a trailing `#` comment.
    pub comment_start: Option<usize>,
    /// Innermost node this line belongs to; `None` for root-level text.
    pub owner: Option<usize>,
    pub document: usize,
}

impl Line {
    pub fn has_line_break(&self) -> bool {
        self.next_start > self.range.end
    }

    /// Start offset of the line's content (after the indentation).
    pub fn content_start(&self) -> usize {
        self.range.start + self.indent
    }
}

/// A key or sequence item.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub segment: PathSegment,
    /// Column of the key (or of the `-` of a sequence item).
    pub indent: usize,
    pub line: usize,
    /// The key text, or the `-` of a sequence item.
    pub key_range: SourceRange,
    /// Offset of the `:` after a key.
    pub colon: Option<usize>,
    /// Value written on the same line, without trailing comment.
    pub value_range: Option<SourceRange>,
    /// The value is a `|` or `>` block scalar.
    pub block_scalar: bool,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub document: usize,
}

impl OutlineNode {
    pub fn is_key(&self) -> bool {
        matches!(self.segment, PathSegment::Key(_))
    }

    pub fn key(&self) -> Option<&str> {
        match &self.segment {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

/// Where an offset falls in the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub node: usize,
    /// The key, or the value text under the offset.
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct Outline<'a> {
    text: &'a str,
    pub lines: Vec<Line>,
    pub nodes: Vec<OutlineNode>,
}

impl<'a> Outline<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut builder = Builder {
            text,
            lines: Vec::new(),
            nodes: Vec::new(),
            document: 0,
            block_scalar: None,
        };
        let mut start = 0;
        for raw in text.split_inclusive('\n') {
            let next_start = start + raw.len();
            let body = raw.strip_suffix('\n').unwrap_or(raw);
            let body = body.strip_suffix('\r').unwrap_or(body);
            builder.add_line(SourceRange::new(start, start + body.len()), next_start);
            start = next_start;
        }
        if text.is_empty() || text.ends_with('\n') {
            builder.add_line(SourceRange::point(text.len()), text.len());
        }
        Outline {
            text,
            lines: builder.lines,
            nodes: builder.nodes,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Index of the line containing `offset`.
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|line| line.next_start <= offset)
            .min(self.lines.len().saturating_sub(1))
    }

    /// Whether `offset` is inside a comment.
    pub fn in_comment(&self, offset: usize) -> bool {
        let line = &self.lines[self.line_at(offset)];
        match line.kind {
            LineKind::Comment => offset > line.content_start(),
            _ => line.comment_start.is_some_and(|start| offset > start),
        }
    }

    pub fn path(&self, node: usize) -> PropertyPath {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(self.nodes[id].segment.clone());
            current = self.nodes[id].parent;
        }
        chain.into_iter().rev().collect()
    }

    /// Top-level nodes of a document.
    pub fn roots(&self, document: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent.is_none() && node.document == document)
            .map(|(id, _)| id)
    }

    /// Children of `node`, or the roots of `document` when `node` is `None`.
    pub fn children_of(&self, node: Option<usize>, document: usize) -> Vec<usize> {
        match node {
            Some(id) => self.nodes[id].children.clone(),
            None => self.roots(document).collect(),
        }
    }

    /// The key child of `node` named `key`. Later duplicates win.
    pub fn child_key(&self, node: Option<usize>, document: usize, key: &str) -> Option<usize> {
        self.children_of(node, document)
            .into_iter()
            .rev()
            .find(|&child| self.nodes[child].key() == Some(key))
    }

    pub fn is_within(&self, node: usize, ancestor: usize) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    /// Innermost node whose subtree contains the content at `line` for a line
    /// indented at `indent`: the closest preceding node indented less.
    pub fn enclosing(&self, line: usize, indent: usize) -> Option<usize> {
        let document = self.lines[line].document;
        let mut current = self
            .nodes
            .iter()
            .rposition(|node| node.line < line)
            .filter(|&id| self.nodes[id].document == document);
        while let Some(id) = current {
            if self.nodes[id].indent < indent {
                return Some(id);
            }
            current = self.nodes[id].parent;
        }
        None
    }

    /// The node and the key or value range under `offset`.
    pub fn locate(&self, offset: usize) -> Option<Located> {
        if self.in_comment(offset) {
            return None;
        }
        let line_id = self.line_at(offset);
        let line = &self.lines[line_id];
        if line.kind != LineKind::Content || offset < line.content_start() {
            return None;
        }

        let on_line: Vec<usize> = (0..self.nodes.len())
            .filter(|&id| self.nodes[id].line == line_id)
            .collect();
        let content_end = line.comment_start.unwrap_or(line.range.end);
        let content = trimmed(self.text, SourceRange::new(line.content_start(), content_end));

        let Some(&innermost) = on_line
            .iter()
            .rev()
            .find(|&&id| self.nodes[id].key_range.start <= offset)
        else {
            // Continuation of a value started on an earlier line.
            return line.owner.map(|node| Located {
                node,
                range: content,
            });
        };

        let node = &self.nodes[innermost];
        if node.is_key() && node.key_range.touches(offset) {
            return Some(Located {
                node: innermost,
                range: node.key_range,
            });
        }
        Some(Located {
            node: innermost,
            range: node.value_range.unwrap_or(node.key_range),
        })
    }

    /// Offset just past the last line belonging to `node`'s subtree, and
    /// whether that line ends with a line break.
    ///
    /// Blank and comment lines after the subtree are not part of it.
    pub fn subtree_end(&self, node: usize) -> (usize, bool) {
        let first = self.nodes[node].line;
        let mut last = first;
        for (id, line) in self.lines.iter().enumerate().skip(first + 1) {
            match line.kind {
                LineKind::Blank | LineKind::Comment => continue,
                LineKind::DocumentMarker => break,
                LineKind::Content => {}
            }
            if line.owner.is_some_and(|owner| self.is_within(owner, node)) {
                last = id;
            } else {
                break;
            }
        }
        let line = &self.lines[last];
        (line.next_start, line.has_line_break())
    }

    /// Column of `node`'s first key child, if it has one.
    pub fn child_indent(&self, node: Option<usize>, document: usize) -> Option<usize> {
        self.children_of(node, document)
            .into_iter()
            .find(|&child| self.nodes[child].is_key())
            .map(|child| self.nodes[child].indent)
    }

    /// First non-blank character after the colon of `node`, looking at the
    /// rest of the key line and then at the lines of its subtree. Falls back
    /// to just after the colon.
    pub fn value_start(&self, node: usize) -> Option<usize> {
        let colon = self.nodes[node].colon?;
        if let Some(value) = self.nodes[node].value_range {
            return Some(value.start);
        }
        let first = self.nodes[node].line;
        for line in self.lines.iter().skip(first + 1) {
            match line.kind {
                LineKind::Blank | LineKind::Comment => continue,
                LineKind::DocumentMarker => break,
                LineKind::Content => {}
            }
            if line.owner.is_some_and(|owner| self.is_within(owner, node)) {
                return Some(line.content_start());
            }
            break;
        }
        Some(colon + 1)
    }
}

fn trimmed(text: &str, range: SourceRange) -> SourceRange {
    let slice = range.slice(text);
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.start + slice.trim_end().len();
    SourceRange::new(start, end.max(start))
}

struct Builder<'a> {
    text: &'a str,
    lines: Vec<Line>,
    nodes: Vec<OutlineNode>,
    document: usize,
    /// Indentation of a key whose block scalar value is being read.
    block_scalar: Option<(usize, usize)>,
}

impl Builder<'_> {
    fn add_line(&mut self, range: SourceRange, next_start: usize) {
        let body = range.slice(self.text);
        let indent = body.len() - body.trim_start_matches(' ').len();
        let content = &body[indent..];
        let line_id = self.lines.len();

        let mut line = Line {
            range,
            next_start,
            indent,
            kind: LineKind::Content,
            comment_start: None,
            owner: None,
            document: self.document,
        };

        if content.trim().is_empty() {
            line.kind = LineKind::Blank;
            self.lines.push(line);
            return;
        }

        if let Some((scalar_indent, owner)) = self.block_scalar {
            if indent > scalar_indent {
                line.owner = Some(owner);
                self.lines.push(line);
                return;
            }
            self.block_scalar = None;
        }

        if content.starts_with('#') {
            line.kind = LineKind::Comment;
            self.lines.push(line);
            return;
        }
        if indent == 0 && (is_marker(content, "---") || is_marker(content, "...")) {
            line.kind = LineKind::DocumentMarker;
            self.document += 1;
            line.document = self.document;
            self.lines.push(line);
            return;
        }

        line.comment_start = comment_start(content).map(|i| range.start + indent + i);
        let content_end = line
            .comment_start
            .map_or(content.len(), |start| start - range.start - indent);
        let content = &content[..content_end];

        self.lines.push(line);
        let owner = self.parse_content(line_id, range.start + indent, indent, content);
        self.lines[line_id].owner = owner;
    }

    /// Parse the content of a line starting at `offset` (column `column`).
    /// Returns the innermost node of the line.
    fn parse_content(
        &mut self,
        line: usize,
        offset: usize,
        column: usize,
        content: &str,
    ) -> Option<usize> {
        if content == "-" || content.starts_with("- ") {
            let parent = self.parent_for(column, true);
            let index = self
                .siblings(parent)
                .filter(|&id| matches!(self.nodes[id].segment, PathSegment::Index(_)))
                .count();
            let item = self.push_node(OutlineNode {
                segment: PathSegment::Index(index),
                indent: column,
                line,
                key_range: SourceRange::new(offset, offset + 1),
                colon: None,
                value_range: None,
                block_scalar: false,
                parent,
                children: Vec::new(),
                document: self.document,
            });
            let rest = &content[1..];
            let skip = rest.len() - rest.trim_start().len();
            let rest = rest.trim_start();
            if rest.is_empty() {
                return Some(item);
            }
            let inner_offset = offset + 1 + skip;
            let inner_column = column + 1 + skip;
            if rest == "-" || rest.starts_with("- ") || split_key(rest).is_some() {
                return self.parse_content(line, inner_offset, inner_column, rest);
            }
            let end = inner_offset + rest.trim_end().len();
            self.nodes[item].value_range = Some(SourceRange::new(inner_offset, end));
            return Some(item);
        }

        if let Some(key) = split_key(content) {
            let parent = self.parent_for(column, false);
            let value = key.value.map(|(start, end)| SourceRange::new(offset + start, offset + end));
            let block_scalar = value
                .map(|range| range.slice(self.text))
                .is_some_and(|v| v.starts_with('|') || v.starts_with('>'));
            let node = self.push_node(OutlineNode {
                segment: PathSegment::Key(key.name),
                indent: column,
                line,
                key_range: SourceRange::new(offset + key.key.0, offset + key.key.1),
                colon: Some(offset + key.colon),
                value_range: value,
                block_scalar,
                parent,
                children: Vec::new(),
                document: self.document,
            });
            if block_scalar {
                self.block_scalar = Some((column, node));
            }
            return Some(node);
        }

        // Neither key nor item: belongs to whatever it is indented under.
        self.enclosing(column)
    }

    fn push_node(&mut self, node: OutlineNode) -> usize {
        let id = self.nodes.len();
        if let Some(parent) = node.parent {
            self.nodes[parent].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    fn siblings(&self, parent: Option<usize>) -> impl Iterator<Item = usize> + '_ {
        let document = self.document;
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, node)| node.parent == parent && node.document == document)
            .map(|(id, _)| id)
    }

    /// Closest preceding node of this document indented less than `column`.
    fn enclosing(&self, column: usize) -> Option<usize> {
        let mut current = self
            .nodes
            .last()
            .filter(|node| node.document == self.document)
            .map(|_| self.nodes.len() - 1);
        while let Some(id) = current {
            if self.nodes[id].indent < column {
                return Some(id);
            }
            current = self.nodes[id].parent;
        }
        None
    }

    /// Parent of a new node at `column`.
    ///
    /// Sequence items may sit at the same column as the key owning the
    /// sequence (`list:\n- a`); such an item attaches to that key.
    fn parent_for(&self, column: usize, item: bool) -> Option<usize> {
        let mut current = self
            .nodes
            .last()
            .filter(|node| node.document == self.document)
            .map(|_| self.nodes.len() - 1);
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.indent < column {
                return Some(id);
            }
            if item && node.indent == column && node.is_key() && node.value_range.is_none() {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }
}

fn is_marker(content: &str, marker: &str) -> bool {
    content
        .strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
}

/// Position of a ` #` comment in a line's content, ignoring `#` in quotes.
fn comment_start(content: &str) -> Option<usize> {
    let mut quote = None;
    let mut previous = ' ';
    for (i, c) in content.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => {
                if previous == ' ' || previous == ':' || i == 0 {
                    quote = Some(c);
                }
            }
            None if c == '#' && (i == 0 || previous == ' ' || previous == '\t') => {
                return Some(i);
            }
            None => {}
        }
        previous = c;
    }
    None
}

struct SplitKey {
    name: String,
    /// Byte range of the key text, quotes included.
    key: (usize, usize),
    colon: usize,
    value: Option<(usize, usize)>,
}

/// Split `key: value` content. Offsets are relative to `content`.
fn split_key(content: &str) -> Option<SplitKey> {
    let (name, key_end) = match content.chars().next()? {
        q @ ('\'' | '"') => {
            let close = content[1..].find(q)? + 1;
            (content[1..close].to_string(), close + 1)
        }
        '?' | '[' | '{' | '-' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' => return None,
        _ => {
            let end = key_colon(content)?;
            (content[..end].trim_end().to_string(), content[..end].trim_end().len())
        }
    };
    if name.is_empty() && !content.starts_with(['\'', '"']) {
        return None;
    }
    let after_key = &content[key_end..];
    let colon = key_end + after_key.len() - after_key.trim_start().len();
    if !content[colon..].starts_with(':') {
        return None;
    }
    let rest = &content[colon + 1..];
    let value_start = colon + 1 + (rest.len() - rest.trim_start().len());
    let value_end = colon + 1 + rest.trim_end().len();
    let value = (value_end > value_start).then_some((value_start, value_end));
    Some(SplitKey {
        name,
        key: (0, key_end),
        colon,
        value,
    })
}

/// Offset of the `:` ending a plain key.
///
/// Prefers a colon followed by a blank. Half-typed `key:value` lines still
/// count as keys, except for URL-like `scheme://` text.
fn key_colon(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let colons = || content.match_indices(':').map(|(i, _)| i).filter(|&i| i > 0);
    colons()
        .find(|&i| matches!(bytes.get(i + 1), None | Some(b' ' | b'\t')))
        .or_else(|| colons().find(|&i| !matches!(bytes.get(i + 1), Some(b'/' | b':'))))
}
