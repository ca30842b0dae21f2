//! Content assist.
//!
//! Completion works on the [`Outline`] of the document, never on a parse:
//! text that is being typed is rarely valid YAML. A request goes through
//! three steps.
//!
//! 1. The cursor's *context* is the outline node new keys will be written
//!    under, together with the *query*, the text typed so far.
//! 2. *Candidates* are index properties below the context path, bean
//!    properties of the context's type and, after a `key:` on the cursor
//!    line, the values the key's type allows.
//! 3. Every matching candidate is *spliced* into the document. Keys that
//!    already exist below the context are reused; only the missing tail of
//!    the key chain is written, at the cursor when nothing of it exists yet
//!    and at the end of the deepest existing mapping otherwise.

use crate::edit::{TextEdit, map_offset, offset_in_edit};
use crate::error::{Result, check_offset};
use crate::fuzzy::QueryMatcher;
use crate::outline::{LineKind, Outline};
use crate::path::{PathSegment, PropertyPath};
use crate::resolve::{declared_type, render, type_at};
use crate::types::{CompletionProposal, ProposalKind};
use bootprops_metadata::{PropertyIndex, TypeCatalog, TypeRef, TypeShape};
use bootprops_yaml::SourceRange;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Indentation width of synthesized keys unless configured otherwise.
pub(crate) const DEFAULT_INDENT: usize = 2;

/// Completion proposals at `offset`, best first.
///
/// Proposals are ordered by match quality of their label against the typed
/// query, then alphabetically. A cursor inside a comment gets no proposals.
///
/// # Errors
///
/// Fails if `offset` is not a position in `text`.
pub fn complete(
    text: &str,
    offset: usize,
    index: &dyn PropertyIndex,
    types: &dyn TypeCatalog,
) -> Result<Vec<CompletionProposal>> {
    Completer {
        index,
        types,
        indent: DEFAULT_INDENT,
    }
    .complete(text, offset)
}

pub(crate) struct Completer<'a> {
    pub(crate) index: &'a dyn PropertyIndex,
    pub(crate) types: &'a dyn TypeCatalog,
    pub(crate) indent: usize,
}

/// Where new keys go.
#[derive(Debug)]
struct Context {
    node: Option<usize>,
    document: usize,
    path: PropertyPath,
    /// Typed text the proposal replaces. Ends at the cursor.
    query: SourceRange,
    /// The cursor follows `key:` on the key's own line.
    value_position: bool,
    /// Column of the first key written in place.
    column: usize,
}

struct Candidate {
    label: String,
    kind: ProposalKind,
    /// Keys to write, outermost first. Empty for values.
    segments: Vec<String>,
    ty: Option<TypeRef>,
    type_name: Option<String>,
    description: Option<String>,
}

impl Completer<'_> {
    pub(crate) fn complete(&self, text: &str, offset: usize) -> Result<Vec<CompletionProposal>> {
        check_offset(text, offset)?;
        let outline = Outline::new(text);
        let Some(context) = self.context(&outline, offset) else {
            debug!(offset, "no completion context");
            return Ok(Vec::new());
        };
        let query = context.query.slice(text);

        let mut matcher = QueryMatcher::new(query);
        let mut scored: Vec<(f64, Candidate)> = self
            .candidates(&context)
            .into_iter()
            .filter_map(|candidate| {
                matcher
                    .score(&candidate.label)
                    .map(|matched| (matched.score, candidate))
            })
            .collect();
        scored.sort_by(|(a, x), (b, y)| b.total_cmp(a).then_with(|| x.label.cmp(&y.label)));

        let proposals: Vec<CompletionProposal> = scored
            .into_iter()
            .map(|(score, candidate)| self.proposal(&outline, &context, candidate, score))
            .collect();
        debug!(
            offset,
            context = %context.path,
            query,
            count = proposals.len(),
            "completion"
        );
        Ok(proposals)
    }

    fn context(&self, outline: &Outline<'_>, offset: usize) -> Option<Context> {
        if outline.in_comment(offset) {
            return None;
        }
        let text = outline.text();
        let line_id = outline.line_at(offset);
        let line = &outline.lines[line_id];
        if matches!(line.kind, LineKind::Comment | LineKind::DocumentMarker) {
            return None;
        }
        let document = line.document;
        let column = |at: usize| at - line.range.start;
        let path_of = |node: Option<usize>| node.map(|id| outline.path(id)).unwrap_or_default();

        let on_line = outline
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.line == line_id && node.key_range.start < offset)
            .map(|(id, _)| id)
            .last();

        if let Some(id) = on_line {
            let node = &outline.nodes[id];
            return Some(match node.colon {
                Some(colon) if colon < offset => Context {
                    node: Some(id),
                    document,
                    path: outline.path(id),
                    query: SourceRange::new(skip_blanks(text, colon + 1, offset), offset),
                    value_position: true,
                    column: node.indent + self.indent,
                },
                // Inside a key that is being retyped.
                Some(_) => Context {
                    node: node.parent,
                    document,
                    path: path_of(node.parent),
                    query: SourceRange::new(node.key_range.start, offset),
                    value_position: false,
                    column: column(node.key_range.start),
                },
                // After the dash of a sequence item.
                None => {
                    let start = skip_blanks(text, node.key_range.end, offset);
                    Context {
                        node: Some(id),
                        document,
                        path: outline.path(id),
                        query: SourceRange::new(start, offset),
                        value_position: false,
                        column: column(start),
                    }
                }
            });
        }

        let indent = line.indent.min(column(offset));
        if let Some(owner) = line.owner {
            let owner = &outline.nodes[owner];
            if owner.block_scalar && indent > owner.indent {
                return None;
            }
        }
        let node = outline.enclosing(line_id, indent);
        Some(Context {
            node,
            document,
            path: path_of(node),
            query: SourceRange::new(line.range.start + indent, offset),
            value_position: false,
            column: indent,
        })
    }

    fn candidates(&self, context: &Context) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let segments = context.path.flattened();

        if segments.iter().all(|segment| matches!(segment, PathSegment::Key(_))) {
            let prefix = render(&segments);
            let properties = if prefix.is_empty() {
                self.index.find_with_prefix("")
            } else {
                self.index.find_with_prefix(&format!("{prefix}."))
            };
            for property in properties {
                let relative = if prefix.is_empty() {
                    property.path.as_str()
                } else {
                    &property.path[prefix.len() + 1..]
                };
                candidates.push(Candidate {
                    label: relative.to_string(),
                    kind: ProposalKind::Property,
                    segments: relative.split('.').map(str::to_string).collect(),
                    ty: declared_type(property),
                    type_name: property.type_name.clone(),
                    description: property.description.clone(),
                });
            }
        }

        let shape = type_at(&context.path, self.index, self.types)
            .map(|ty| TypeShape::of(&ty, self.types));
        if let Some(TypeShape::Bean { properties }) = &shape {
            for property in properties {
                let name = property.yaml_name();
                candidates.push(Candidate {
                    label: name.clone(),
                    kind: ProposalKind::BeanProperty,
                    segments: vec![name],
                    ty: TypeRef::parse(&property.type_name).ok(),
                    type_name: Some(property.type_name.clone()),
                    description: property.description.clone(),
                });
            }
        }

        if context.value_position {
            let mut values: Vec<(String, Option<String>)> = shape
                .iter()
                .flat_map(TypeShape::value_choices)
                .map(|value| (value, None))
                .collect();
            if let Some(property) = self.index.find_exact(&render(&segments)) {
                values.extend(
                    property
                        .hints
                        .iter()
                        .map(|hint| (hint.text(), hint.description.clone())),
                );
            }
            for (value, description) in values {
                candidates.push(Candidate {
                    label: value,
                    kind: ProposalKind::Value,
                    segments: Vec::new(),
                    ty: None,
                    type_name: None,
                    description,
                });
            }
        }

        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.label.clone()));
        trace!(context = %context.path, count = candidates.len(), "candidates");
        candidates
    }

    fn proposal(
        &self,
        outline: &Outline<'_>,
        context: &Context,
        candidate: Candidate,
        score: f64,
    ) -> CompletionProposal {
        let (edits, cursor) = if candidate.segments.is_empty() {
            let edit = TextEdit::new(context.query, candidate.label.clone());
            (vec![edit], context.query.start + candidate.label.len())
        } else {
            self.splice(outline, context, &candidate.segments, candidate.ty.as_ref())
        };
        CompletionProposal {
            label: candidate.label,
            kind: candidate.kind,
            type_name: candidate.type_name,
            description: candidate.description,
            edits,
            cursor,
            score,
        }
    }

    /// Edits writing the key chain `segments` below the context, and the
    /// resulting cursor.
    fn splice(
        &self,
        outline: &Outline<'_>,
        context: &Context,
        segments: &[String],
        ty: Option<&TypeRef>,
    ) -> (Vec<TextEdit>, usize) {
        let mut deepest = context.node;
        let mut matched = 0;
        for segment in segments {
            match outline.child_key(deepest, context.document, segment) {
                Some(child) => {
                    deepest = Some(child);
                    matched += 1;
                }
                None => break,
            }
        }
        let delete_query = (!context.query.is_empty()).then(|| TextEdit::delete(context.query));

        match deepest {
            // Everything exists: drop the query and go to the existing value.
            Some(existing) if matched == segments.len() => {
                let target = outline
                    .value_start(existing)
                    .unwrap_or(outline.nodes[existing].key_range.end);
                let edits: Vec<TextEdit> = delete_query.into_iter().collect();
                let cursor = map_offset(&edits, target);
                (edits, cursor)
            }
            // Part exists: append the missing keys to the deepest one.
            Some(existing) if matched > 0 => {
                let (end, line_break) = outline.subtree_end(existing);
                let base = outline
                    .child_indent(Some(existing), context.document)
                    .unwrap_or(outline.nodes[existing].indent + self.indent);
                let (chain, within) = self.key_chain(&segments[matched..], base, ty);
                let pad = " ".repeat(base);
                let (inserted, within) = if line_break {
                    (format!("{pad}{chain}\n"), base + within)
                } else {
                    (format!("\n{pad}{chain}"), 1 + base + within)
                };
                let mut edits = vec![TextEdit::insert(end, inserted)];
                edits.extend(delete_query);
                let cursor = offset_in_edit(&edits, 0, within);
                (edits, cursor)
            }
            _ => {
                let lead = if context.value_position {
                    format!("\n{}", " ".repeat(context.column))
                } else {
                    String::new()
                };
                let (chain, within) = self.key_chain(segments, context.column, ty);
                let cursor = context.query.start + lead.len() + within;
                (vec![TextEdit::new(context.query, format!("{lead}{chain}"))], cursor)
            }
        }
    }

    /// `a:\n  b:\n    c: ` for segments `a`, `b`, `c` whose first key sits
    /// at column `base`, ending in the value template for `ty`. Returns the
    /// text and the cursor position within it.
    fn key_chain(&self, segments: &[String], base: usize, ty: Option<&TypeRef>) -> (String, usize) {
        let mut chain = String::new();
        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 {
                chain.push('\n');
                chain.push_str(&" ".repeat(base + depth * self.indent));
            }
            chain.push_str(segment);
            chain.push(':');
        }
        let level = base + segments.len().saturating_sub(1) * self.indent;
        let child_indent = " ".repeat(level + self.indent);
        match ty.map(|ty| TypeShape::of(ty, self.types)) {
            Some(TypeShape::Map { .. } | TypeShape::Bean { .. }) => {
                chain.push('\n');
                chain.push_str(&child_indent);
            }
            Some(TypeShape::List { .. }) => {
                chain.push('\n');
                chain.push_str(&child_indent);
                chain.push_str("- ");
            }
            _ => chain.push(' '),
        }
        let cursor = chain.len();
        (chain, cursor)
    }
}

/// First offset in `from..to` that is not a space or tab, or `to`.
fn skip_blanks(text: &str, from: usize, to: usize) -> usize {
    let gap = &text[from..to];
    from + (gap.len() - gap.trim_start_matches([' ', '\t']).len())
}
