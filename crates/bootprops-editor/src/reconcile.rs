//! Reconciliation: validating a document against the metadata index.
//!
//! The walk starts in *index context*: every mapping key extends a dotted
//! path that is looked up in the [`PropertyIndex`]. Once a key names an
//! indexed property, the walk switches to *type context* and checks the value
//! against the property's declared type, descending into lists, maps and
//! beans as the type dictates.

use crate::path::PathSegment;
use crate::resolve::{declared_type, owning_property, walk};
use crate::types::{Diagnostic, ProblemType};
use bootprops_metadata::{
    BeanProperty, PropertyIndex, PropertyMetadata, TypeCatalog, TypeRef, TypeShape,
    canonical_name, describe_type,
};
use bootprops_yaml::{MappingEntry, NodeValue, SourceRange, YamlNode, parse_documents};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{[^}]*\}").expect("placeholder pattern is valid")
});

/// Whether a value contains a `${...}` placeholder. Such values are resolved
/// at run time and are never type checked.
pub fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Reconcile `text` against `index`, resolving enum and bean types through
/// `types`.
///
/// A document that does not parse yields a single syntax diagnostic. An empty
/// index yields no diagnostics at all. Diagnostics are ordered by position.
pub fn reconcile(
    text: &str,
    index: &dyn PropertyIndex,
    types: &dyn TypeCatalog,
) -> Vec<Diagnostic> {
    if index.is_empty() {
        debug!("empty metadata index, skipping reconcile");
        return Vec::new();
    }
    match parse_documents(text) {
        Ok(documents) => reconcile_tree(&documents, index, types),
        Err(err) => {
            debug!(%err, "document does not parse");
            vec![Diagnostic::new(
                ProblemType::YamlSyntaxError,
                error_range(text, err.range().start),
                err.message(),
            )]
        }
    }
}

/// Reconcile already parsed documents.
pub fn reconcile_tree(
    documents: &[YamlNode],
    index: &dyn PropertyIndex,
    types: &dyn TypeCatalog,
) -> Vec<Diagnostic> {
    if index.is_empty() {
        return Vec::new();
    }
    let mut reconciler = Reconciler {
        index,
        types,
        diagnostics: Vec::new(),
    };
    for document in documents {
        reconciler.document(document);
    }
    let mut diagnostics = reconciler.diagnostics;
    diagnostics.sort_by_key(|diagnostic| (diagnostic.range.start, diagnostic.range.end));
    debug!(count = diagnostics.len(), "reconciled");
    diagnostics
}

/// The character at `offset`, or an empty range at the end of the text.
fn error_range(text: &str, offset: usize) -> SourceRange {
    let offset = offset.min(text.len());
    match text[offset..].chars().next() {
        Some(c) if c != '\n' => SourceRange::new(offset, offset + c.len_utf8()),
        _ => SourceRange::point(offset),
    }
}

struct Reconciler<'a> {
    index: &'a dyn PropertyIndex,
    types: &'a dyn TypeCatalog,
    diagnostics: Vec<Diagnostic>,
}

impl Reconciler<'_> {
    fn report(&mut self, problem: ProblemType, range: SourceRange, message: String) {
        trace!(?problem, ?range, %message, "problem");
        self.diagnostics.push(Diagnostic::new(problem, range, message));
    }

    fn document(&mut self, root: &YamlNode) {
        match &root.value {
            NodeValue::Mapping(entries) => self.index_context("", entries),
            _ if root.is_null() => {}
            _ => self.report(
                ProblemType::UnexpectedNode,
                root.range,
                format!("Expecting a 'Mapping' node but got a '{}' node", root.kind()),
            ),
        }
    }

    /// Keys of `entries` extend `prefix` and are looked up in the index.
    fn index_context(&mut self, prefix: &str, entries: &[MappingEntry]) {
        for entry in entries {
            let Some(key) = entry.key_text() else {
                self.report(
                    ProblemType::UnexpectedNode,
                    entry.key_range(),
                    format!(
                        "Expecting a 'Scalar' node but got a '{}' node",
                        entry.key.kind()
                    ),
                );
                continue;
            };
            let path = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            };

            if let Some(property) = self.index.find_exact(&path) {
                self.property(property, entry);
            } else if self.index.has_prefix(&format!("{path}.")) {
                match &entry.value.value {
                    NodeValue::Mapping(children) => self.index_context(&path, children),
                    _ if entry.value.is_null() => {}
                    _ => self.report(
                        ProblemType::UnexpectedNode,
                        entry.value.range,
                        format!(
                            "Expecting a 'Mapping' node but got a '{}' node",
                            entry.value.kind()
                        ),
                    ),
                }
            } else if !self.through_property(&path, entry) {
                self.report(
                    ProblemType::UnknownProperty,
                    entry.key_range(),
                    format!("Unknown property '{path}'"),
                );
            }
        }
    }

    fn property(&mut self, property: &PropertyMetadata, entry: &MappingEntry) {
        if property.is_deprecated() {
            let mut message = format!("Property '{}' is deprecated", property.path);
            if let Some(replacement) = property
                .deprecation
                .as_ref()
                .and_then(|d| d.replacement.as_deref())
            {
                message.push_str(&format!(": use '{replacement}' instead"));
            }
            self.report(ProblemType::Deprecated, entry.key_range(), message);
        }
        if let Some(ty) = declared_type(property) {
            self.check(&ty, &entry.value);
        }
    }

    /// A dotted key running through an indexed property into its value
    /// (`logging.level.com.acme: INFO`). Returns false if `path` does not
    /// start with an indexed property or does not fit its type.
    fn through_property(&mut self, path: &str, entry: &MappingEntry) -> bool {
        let segments: Vec<PathSegment> = path
            .split('.')
            .map(|part| PathSegment::Key(part.to_string()))
            .collect();
        let Some((property, used)) = owning_property(self.index, &segments) else {
            return false;
        };
        let Some(ty) = declared_type(property) else {
            // Nothing known about the value, so nothing to check below it.
            return true;
        };
        match walk(ty, &segments[used..], self.types) {
            Some(ty) => {
                self.check(&ty, &entry.value);
                true
            }
            None => false,
        }
    }

    /// Check `node` against type `ty`.
    fn check(&mut self, ty: &TypeRef, node: &YamlNode) {
        if node.is_null() {
            return;
        }
        let shape = TypeShape::of(ty, self.types);
        match shape {
            TypeShape::Unconstrained => {}
            TypeShape::Atomic(_) | TypeShape::Enum { .. } => self.check_scalar(ty, &shape, node),
            TypeShape::List { ref element } => self.check_list(ty, element, node),
            TypeShape::Map { ref value, .. } => self.check_map(ty, value, node),
            TypeShape::Bean { ref properties } => match &node.value {
                NodeValue::Mapping(entries) => self.check_bean(ty, properties, entries),
                _ => self.kind_mismatch(ty, &shape, node),
            },
        }
    }

    fn kind_mismatch(&mut self, ty: &TypeRef, shape: &TypeShape, node: &YamlNode) {
        self.report(
            ProblemType::TypeMismatch,
            node.range,
            format!(
                "Expecting a '{}' but got a '{}' node",
                describe_type(ty, shape),
                node.kind()
            ),
        );
    }

    fn check_scalar(&mut self, ty: &TypeRef, shape: &TypeShape, node: &YamlNode) {
        let Some(scalar) = node.as_scalar() else {
            self.kind_mismatch(ty, shape, node);
            return;
        };
        if !accepts(shape, &scalar.text) {
            self.report(
                ProblemType::TypeMismatch,
                node.range,
                format!(
                    "Expecting a '{}' but got '{}'",
                    describe_type(ty, shape),
                    scalar.text
                ),
            );
        }
    }

    fn check_list(&mut self, ty: &TypeRef, element: &TypeRef, node: &YamlNode) {
        match &node.value {
            NodeValue::Sequence(items) => {
                for item in items {
                    self.check(element, item);
                }
            }
            NodeValue::Mapping(entries) => {
                // Indexed form: `list:\n  0: a\n  1: b`.
                for entry in entries {
                    match entry.key_text() {
                        Some(key) if key.trim().parse::<usize>().is_ok() => {
                            self.check(element, &entry.value)
                        }
                        Some(key) => self.report(
                            ProblemType::TypeMismatch,
                            entry.key_range(),
                            format!("Expecting a 'Integer' but got '{key}'"),
                        ),
                        None => self.report(
                            ProblemType::TypeMismatch,
                            entry.key_range(),
                            format!(
                                "Expecting a 'Integer' but got a '{}' node",
                                entry.key.kind()
                            ),
                        ),
                    }
                }
            }
            NodeValue::Scalar(scalar) => {
                // Comma separated form: `init-sqls: a,b,c`.
                let element_shape = TypeShape::of(element, self.types);
                if !element_shape.is_scalar() {
                    let shape = TypeShape::of(ty, self.types);
                    self.kind_mismatch(ty, &shape, node);
                    return;
                }
                for item in scalar.text.split(',').map(str::trim) {
                    if !item.is_empty() && !accepts(&element_shape, item) {
                        self.report(
                            ProblemType::TypeMismatch,
                            node.range,
                            format!(
                                "Expecting a '{}' but got '{item}'",
                                describe_type(element, &element_shape)
                            ),
                        );
                    }
                }
            }
        }
    }

    fn check_map(&mut self, ty: &TypeRef, value: &TypeRef, node: &YamlNode) {
        let NodeValue::Mapping(entries) = &node.value else {
            let shape = TypeShape::of(ty, self.types);
            self.kind_mismatch(ty, &shape, node);
            return;
        };
        let scalar_values = TypeShape::of(value, self.types).is_scalar();
        for entry in entries {
            if scalar_values && entry.value.is_mapping() {
                // Nested keys extend the map key: `level:\n  com:\n    acme: INFO`.
                self.check(ty, &entry.value);
            } else {
                self.check(value, &entry.value);
            }
        }
    }

    fn check_bean(
        &mut self,
        ty: &TypeRef,
        properties: &[BeanProperty],
        entries: &[MappingEntry],
    ) {
        for entry in entries {
            let Some(key) = entry.key_text() else {
                self.report(
                    ProblemType::TypeMismatch,
                    entry.key_range(),
                    format!(
                        "Expecting a bean-property name for object of type '{ty}' but got a '{}' node",
                        entry.key.kind()
                    ),
                );
                continue;
            };
            let mut parts = key.split('.');
            let first = parts.next().unwrap_or(key);
            let wanted = canonical_name(first);
            let Some(property) = properties
                .iter()
                .find(|property| canonical_name(&property.name) == wanted)
            else {
                self.report(
                    ProblemType::UnknownProperty,
                    entry.key_range(),
                    format!("Unknown property '{first}' for type '{ty}'"),
                );
                continue;
            };
            let Ok(property_type) = TypeRef::parse(&property.type_name) else {
                continue;
            };
            let rest: Vec<PathSegment> = parts.map(|p| PathSegment::Key(p.to_string())).collect();
            match walk(property_type, &rest, self.types) {
                Some(target) => self.check(&target, &entry.value),
                None => self.report(
                    ProblemType::UnknownProperty,
                    entry.key_range(),
                    format!("Unknown property '{key}' for type '{ty}'"),
                ),
            }
        }
    }
}

fn accepts(shape: &TypeShape, text: &str) -> bool {
    if is_placeholder(text) {
        return true;
    }
    match shape {
        TypeShape::Atomic(kind) => kind.accepts(text),
        TypeShape::Enum { constants } => constants.iter().any(|c| c == text.trim()),
        _ => true,
    }
}
