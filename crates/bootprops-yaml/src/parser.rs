//! YAML parser that builds [`YamlNode`] trees with byte ranges.

use crate::source_range::OffsetMap;
use crate::{Error, MappingEntry, Result, Scalar, ScalarStyle, SourceRange, YamlNode};
use tracing::trace;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse the first document of a YAML stream.
///
/// An input without any document (empty, or only comments) yields an empty
/// null node at offset 0.
///
/// # Example
///
/// ```rust
/// use bootprops_yaml::parse;
///
/// let yaml = parse("server:\n  port: 8888").unwrap();
/// let port = yaml.get("server").and_then(|s| s.get("port")).unwrap();
/// assert_eq!(port.as_scalar().unwrap().text, "8888");
/// assert_eq!(port.range.start, 16);
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] when the scanner or parser rejects the text.
pub fn parse(content: &str) -> Result<YamlNode> {
    let documents = parse_documents(content)?;
    Ok(documents
        .into_iter()
        .next()
        .unwrap_or_else(|| YamlNode::new_empty(SourceRange::point(0))))
}

/// Parse every document of a (possibly `---` separated) YAML stream.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for the first scanner or parser failure. Nothing
/// is returned for the documents preceding the failure.
pub fn parse_documents(content: &str) -> Result<Vec<YamlNode>> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(content);

    parser
        .load(&mut builder, true)
        .map_err(|err| syntax_error(content, &builder.offsets, err.marker(), err.info()))?;

    let documents = builder.finish();
    trace!(documents = documents.len(), "parsed yaml stream");
    Ok(documents)
}

fn syntax_error(content: &str, offsets: &OffsetMap, marker: &Marker, info: &str) -> Error {
    let offset = offsets.byte_offset(marker.index());
    let (line, column) = line_and_column(content, offset);
    Error::Syntax {
        message: info.to_string(),
        offset,
        line,
        column,
    }
}

/// 1-based line and column (in characters) of a byte offset.
fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Builder that implements MarkedEventReceiver to construct YamlNode trees.
struct YamlBuilder<'a> {
    source: &'a str,
    offsets: OffsetMap,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Root of the document currently being parsed
    root: Option<YamlNode>,

    /// Completed documents
    documents: Vec<YamlNode>,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        start: usize,
        flow: bool,
        items: Vec<YamlNode>,
    },
    Mapping {
        start: usize,
        flow: bool,
        entries: Vec<(YamlNode, Option<YamlNode>)>,
    },
}

impl BuildNode {
    fn is_flow(&self) -> bool {
        match self {
            BuildNode::Sequence { flow, .. } | BuildNode::Mapping { flow, .. } => *flow,
        }
    }
}

impl<'a> YamlBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offsets: OffsetMap::new(source),
            stack: Vec::new(),
            root: None,
            documents: Vec::new(),
        }
    }

    fn finish(mut self) -> Vec<YamlNode> {
        if let Some(root) = self.root.take() {
            self.documents.push(root);
        }
        self.documents
    }

    fn push_complete(&mut self, node: YamlNode) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(node);
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(node),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }

    fn in_flow(&self) -> bool {
        self.stack.iter().any(BuildNode::is_flow)
    }

    /// Where a missing value should be anchored.
    ///
    /// yaml-rust2 reports an absent value with the marker of whatever token
    /// comes next, which may be several lines further down. Anchor it right
    /// behind the indicator that introduced it instead.
    fn empty_value_range(&self, marker_offset: usize) -> SourceRange {
        let offset = match self.stack.last() {
            Some(BuildNode::Mapping { entries, .. }) => match entries.last() {
                Some((key, None)) => {
                    after_indicator(self.source, key.range.end, ':').unwrap_or(key.range.end)
                }
                _ => marker_offset,
            },
            Some(BuildNode::Sequence { start, items, .. }) => {
                let from = items.last().map_or(*start, |item| item.range.end);
                after_indicator(self.source, from, '-').unwrap_or(marker_offset)
            }
            None => marker_offset,
        };
        SourceRange::point(offset)
    }

    fn scalar_node(&self, value: String, style: TScalarStyle, marker_offset: usize) -> YamlNode {
        let style = match style {
            TScalarStyle::Plain => ScalarStyle::Plain,
            TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
            TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
            TScalarStyle::Literal => ScalarStyle::Literal,
            TScalarStyle::Folded => ScalarStyle::Folded,
        };
        // A plain scalar cannot be written as empty text: this is an absent
        // value (`port:`), reported at the next token.
        if style == ScalarStyle::Plain && value.is_empty() {
            return YamlNode::new_empty(self.empty_value_range(marker_offset));
        }

        // Block scalars are reported at their first content line.
        let start = match style {
            ScalarStyle::Literal => block_indicator(self.source, marker_offset, '|'),
            ScalarStyle::Folded => block_indicator(self.source, marker_offset, '>'),
            _ => marker_offset,
        };
        let end = scalar_end(self.source, start, &value, style, self.in_flow());
        YamlNode::new_scalar(
            Scalar {
                text: value,
                style,
                empty: false,
            },
            SourceRange::new(start, end),
        )
    }

    /// The `-` of the first item when a sequence starting at `offset` is an
    /// indentless sequence (`key:\n- a`). Those are reported at the first
    /// item's content rather than at the dash.
    fn indentless_dash(&self, offset: usize) -> Option<usize> {
        match self.stack.last() {
            Some(BuildNode::Mapping {
                flow: false,
                entries,
                ..
            }) if matches!(entries.last(), Some((_, None))) => {
                let begin = line_start(self.source, offset);
                let mut before = &self.source[begin..offset];
                if let Some(comment) = before.find(" #") {
                    before = &before[..comment];
                }
                let before = before.trim_end_matches([' ', '\t']);
                before.ends_with('-').then(|| begin + before.len() - 1)
            }
            _ => None,
        }
    }

    fn close_collection(&mut self, end_offset: usize) -> Option<YamlNode> {
        match self.stack.pop()? {
            BuildNode::Sequence { start, flow, items } => {
                let end = collection_end(start, flow, end_offset, items.iter().map(|n| n.range));
                Some(YamlNode::new_sequence(items, SourceRange::new(start, end)))
            }
            BuildNode::Mapping {
                start,
                flow,
                entries,
            } => {
                // Block mappings are reported at the first key's `:`.
                let start = entries
                    .first()
                    .map_or(start, |(key, _)| start.min(key.range.start));
                let entries: Vec<MappingEntry> = entries
                    .into_iter()
                    .map(|(key, value)| {
                        let value = value.unwrap_or_else(|| {
                            YamlNode::new_empty(SourceRange::point(key.range.end))
                        });
                        MappingEntry { key, value }
                    })
                    .collect();
                let end = collection_end(
                    start,
                    flow,
                    end_offset,
                    entries.iter().map(MappingEntry::range),
                );
                Some(YamlNode::new_mapping(entries, SourceRange::new(start, end)))
            }
        }
    }
}

impl MarkedEventReceiver for YamlBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        let offset = self.offsets.byte_offset(marker.index());
        match ev {
            Event::Scalar(value, style, ..) => {
                let node = self.scalar_node(value, style, offset);
                self.push_complete(node);
            }

            Event::SequenceStart(..) => {
                let dash = self.indentless_dash(offset);
                let flow = dash.is_none() && self.source[offset..].starts_with('[');
                self.stack.push(BuildNode::Sequence {
                    start: dash.unwrap_or(offset),
                    flow,
                    items: Vec::new(),
                });
            }

            Event::MappingStart(..) => {
                let flow = self.source[offset..].starts_with('{');
                self.stack.push(BuildNode::Mapping {
                    start: offset,
                    flow,
                    entries: Vec::new(),
                });
            }

            Event::SequenceEnd | Event::MappingEnd => {
                if let Some(node) = self.close_collection(offset) {
                    self.push_complete(node);
                }
            }

            Event::Alias(..) => {
                // Aliases are not followed; the node stands in as a value-less
                // placeholder so type checks let it through.
                let len = self.source[offset..]
                    .find(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | '}'))
                    .unwrap_or(self.source.len() - offset);
                self.push_complete(YamlNode::new_empty(SourceRange::new(offset, offset + len)));
            }

            Event::DocumentEnd => {
                self.stack.clear();
                if let Some(root) = self.root.take() {
                    self.documents.push(root);
                }
            }

            _ => {}
        }
    }
}

/// End of a collection: the closing bracket for flow style, the end of the
/// last child for block style.
fn collection_end(
    start: usize,
    flow: bool,
    end_marker: usize,
    children: impl Iterator<Item = SourceRange>,
) -> usize {
    if flow {
        return end_marker + 1;
    }
    children.map(|range| range.end).fold(start, usize::max)
}

/// Offset just past `indicator` if it is the next non-blank character after
/// `from`.
fn after_indicator(source: &str, from: usize, indicator: char) -> Option<usize> {
    let rest = source.get(from..)?;
    let skipped = rest.len() - rest.trim_start().len();
    rest[skipped..]
        .starts_with(indicator)
        .then(|| from + skipped + indicator.len_utf8())
}

/// Offset of the `|` or `>` header of a block scalar whose content starts at
/// `content`. Empty block scalars are reported at the header itself or at
/// the next token; both lie on or after the header line.
fn block_indicator(source: &str, content: usize, indicator: char) -> usize {
    let mut line = line_start(source, content);
    if source[line..content].trim().is_empty() {
        // Walk back over blank lines to the header.
        while line > 0 {
            line = line_start(source, line - 1);
            let text = &source[line..];
            let text = &text[..text.find('\n').unwrap_or(text.len())];
            if !text.trim().is_empty() {
                break;
            }
        }
    }
    let text = &source[line..];
    let mut header = &text[..text.find('\n').unwrap_or(text.len())];
    if let Some(comment) = header.find(" #") {
        header = &header[..comment];
    }
    let header = header.trim_end();
    let token = header.rfind(char::is_whitespace).map_or(0, |i| i + 1);
    if header[token..].starts_with(indicator) {
        line + token
    } else {
        content
    }
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Length of a plain scalar's text on a single line: up to a comment or the
/// end of line, trailing blanks excluded.
fn plain_len_on_line(line: &str, in_flow: bool) -> usize {
    let mut end = line.find('\n').unwrap_or(line.len());
    if let Some(comment) = line[..end].find(" #") {
        end = comment;
    }
    if in_flow {
        if let Some(stop) = line[..end].find([',', ']', '}']) {
            end = stop;
        }
    }
    line[..end].trim_end().len()
}

/// Compute where a scalar starting at `start` ends in the source.
fn scalar_end(source: &str, start: usize, value: &str, style: ScalarStyle, in_flow: bool) -> usize {
    let rest = &source[start..];
    match style {
        ScalarStyle::Plain => {
            if rest.starts_with(value) {
                return start + value.len();
            }
            let mut end = start + plain_len_on_line(rest, in_flow);
            if in_flow {
                return end;
            }
            // Multi-line plain scalar: follow more-indented continuation lines.
            let base = indentation(&source[line_start(source, start)..]);
            let mut pos = start + rest.find('\n').map_or(rest.len(), |i| i + 1);
            while pos < source.len() {
                let line = &source[pos..];
                let line_len = line.find('\n').map_or(line.len(), |i| i + 1);
                let trimmed = line[..line_len].trim();
                if !trimmed.is_empty() {
                    let indent = indentation(line);
                    if indent <= base || trimmed.starts_with('#') {
                        break;
                    }
                    end = pos + indent + plain_len_on_line(&line[indent..], false);
                }
                pos += line_len;
            }
            end
        }
        ScalarStyle::SingleQuoted => {
            let mut chars = rest.char_indices().skip(1).peekable();
            while let Some((i, c)) = chars.next() {
                if c == '\'' {
                    if matches!(chars.peek(), Some((_, '\''))) {
                        chars.next();
                    } else {
                        return start + i + 1;
                    }
                }
            }
            source.len()
        }
        ScalarStyle::DoubleQuoted => {
            let mut chars = rest.char_indices().skip(1);
            while let Some((i, c)) = chars.next() {
                match c {
                    '\\' => {
                        chars.next();
                    }
                    '"' => return start + i + 1,
                    _ => {}
                }
            }
            source.len()
        }
        ScalarStyle::Literal | ScalarStyle::Folded => {
            let header_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let mut end = start + plain_len_on_line(rest, false);
            let base = indentation(&source[line_start(source, start)..]);
            let mut content_indent = None;
            let mut pos = start + header_len;
            while pos < source.len() {
                let line = &source[pos..];
                let line_len = line.find('\n').map_or(line.len(), |i| i + 1);
                let text = line[..line_len].trim_end();
                if !text.trim_start().is_empty() {
                    let indent = indentation(line);
                    let required = *content_indent.get_or_insert(indent);
                    if indent <= base || indent < required {
                        break;
                    }
                    end = pos + text.len();
                }
                pos += line_len;
            }
            end
        }
    }
}
