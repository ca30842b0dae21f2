//! Target types of configuration properties.
//!
//! Property metadata declares types by their (Java style) names, for example
//! `java.util.List<demo.Foo>`. This module parses those names into
//! [`TypeRef`]s and classifies them into a [`TypeShape`] that tells the
//! editor what a value bound to the type must look like. Enums and beans are
//! not known from the name alone; they are looked up in a [`TypeCatalog`].

use crate::property::{canonical_name, kebab_case};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A parsed type name with its type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// The raw (erased) name, e.g. `java.util.Map`.
    pub erasure: String,
    pub params: Vec<TypeRef>,
    /// Number of trailing `[]`.
    pub array_dims: usize,
}

impl TypeRef {
    /// A type without arguments.
    pub fn simple(erasure: impl Into<String>) -> Self {
        Self {
            erasure: erasure.into(),
            params: Vec::new(),
            array_dims: 0,
        }
    }

    /// Parse a declared type name such as
    /// `java.util.Map<java.lang.String,java.util.List<java.lang.Integer>>`.
    ///
    /// Wildcards (`? extends T`, `? super T`) are replaced by their bound and
    /// a bare `?` by `java.lang.Object`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeSyntax`] for unbalanced brackets, empty names or
    /// trailing garbage.
    pub fn parse(name: &str) -> Result<TypeRef> {
        let mut parser = TypeNameParser {
            input: name,
            pos: 0,
        };
        let parsed = parser.parse_type()?;
        parser.skip_blanks();
        if parser.pos != name.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(parsed)
    }

    /// The element type of an array type.
    pub fn component(&self) -> Option<TypeRef> {
        (self.array_dims > 0).then(|| TypeRef {
            erasure: self.erasure.clone(),
            params: self.params.clone(),
            array_dims: self.array_dims - 1,
        })
    }

    /// Name for messages: `java.lang` and `java.util` packages are dropped,
    /// other names stay qualified (`Map<String, demo.Foo>`).
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = ["java.lang.", "java.util."]
            .iter()
            .find_map(|package| {
                self.erasure
                    .strip_prefix(package)
                    .filter(|rest| !rest.contains('.'))
            })
            .unwrap_or(&self.erasure);
        f.write_str(name)?;
        if !self.params.is_empty() {
            f.write_str("<")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{param}")?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

struct TypeNameParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeNameParser<'_> {
    fn error(&self, reason: &str) -> Error {
        Error::TypeSyntax {
            name: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_blanks(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_blanks();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        self.skip_blanks();
        if self.eat('?') {
            self.skip_blanks();
            for bound in ["extends ", "super "] {
                if self.rest().starts_with(bound) {
                    self.pos += bound.len();
                    return self.parse_type();
                }
            }
            return Ok(TypeRef::simple("java.lang.Object"));
        }

        let rest = self.rest();
        let len = rest
            .find(|c: char| matches!(c, '<' | '>' | ',' | '[' | ']') || c.is_whitespace())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        let erasure = rest[..len].to_string();
        self.pos += len;

        let mut params = Vec::new();
        if self.eat('<') {
            loop {
                params.push(self.parse_type()?);
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        let mut array_dims = 0;
        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            array_dims += 1;
        }

        Ok(TypeRef {
            erasure,
            params,
            array_dims,
        })
    }
}

/// A bean property of a [`TypeDescriptor::Bean`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanProperty {
    /// Java property name, e.g. `initSqls`.
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BeanProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            description: None,
        }
    }

    /// The name as written in configuration files (`init-sqls`).
    pub fn yaml_name(&self) -> String {
        kebab_case(&self.name)
    }
}

/// What a [`TypeCatalog`] knows about a non-builtin type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDescriptor {
    Enum { constants: Vec<String> },
    Bean { properties: Vec<BeanProperty> },
}

impl TypeDescriptor {
    /// Find a bean property by relaxed name (`init-sqls`, `initSqls` and
    /// `init_sqls` all match `initSqls`).
    pub fn bean_property(&self, key: &str) -> Option<&BeanProperty> {
        match self {
            TypeDescriptor::Bean { properties } => {
                let wanted = canonical_name(key);
                properties
                    .iter()
                    .find(|property| canonical_name(&property.name) == wanted)
            }
            TypeDescriptor::Enum { .. } => None,
        }
    }
}

/// Resolves type names the metadata cannot describe by itself.
///
/// Backed by whatever type system knows the user's classes; the editor only
/// ever asks questions through this trait.
pub trait TypeCatalog: Send + Sync {
    /// Describe the type with the given erased name, if it is known.
    fn resolve(&self, erasure: &str) -> Option<TypeDescriptor>;
}

/// In-memory [`TypeCatalog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object mapping type names to descriptors:
    ///
    /// ```json
    /// { "demo.Color": { "kind": "enum", "constants": ["RED", "GREEN"] } }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document does not deserialize.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_enum<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        constants: impl IntoIterator<Item = S>,
    ) -> Self {
        self.types.insert(
            name.into(),
            TypeDescriptor::Enum {
                constants: constants.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    pub fn with_bean(
        mut self,
        name: impl Into<String>,
        properties: impl IntoIterator<Item = BeanProperty>,
    ) -> Self {
        self.types.insert(
            name.into(),
            TypeDescriptor::Bean {
                properties: properties.into_iter().collect(),
            },
        );
        self
    }
}

impl TypeCatalog for TypeRegistry {
    fn resolve(&self, erasure: &str) -> Option<TypeDescriptor> {
        self.types.get(erasure).cloned()
    }
}

/// A catalog that knows no types; every non-builtin type is unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl TypeCatalog for EmptyCatalog {
    fn resolve(&self, _erasure: &str) -> Option<TypeDescriptor> {
        None
    }
}

/// Scalar value kinds with a textual representation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicKind {
    /// Any text is acceptable (strings, resources, charsets, ...).
    Text,
    Char,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
}

impl AtomicKind {
    /// Whether `text` is a valid value of this kind.
    pub fn accepts(self, text: &str) -> bool {
        let text = text.trim();
        match self {
            AtomicKind::Text => true,
            AtomicKind::Char => text.chars().count() == 1,
            AtomicKind::Boolean => {
                text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
            }
            AtomicKind::Byte => text.parse::<i8>().is_ok(),
            AtomicKind::Short => text.parse::<i16>().is_ok(),
            AtomicKind::Integer => text.parse::<i32>().is_ok(),
            AtomicKind::Long => text.parse::<i64>().is_ok(),
            AtomicKind::Float | AtomicKind::Double => text.parse::<f64>().is_ok(),
        }
    }

    /// Classify an erased type name, if it is a builtin atomic type.
    pub fn of(erasure: &str) -> Option<AtomicKind> {
        let simple = erasure.strip_prefix("java.lang.").unwrap_or(erasure);
        let kind = match simple {
            "String" | "CharSequence" => AtomicKind::Text,
            "Character" | "char" => AtomicKind::Char,
            "Boolean" | "boolean" => AtomicKind::Boolean,
            "Byte" | "byte" => AtomicKind::Byte,
            "Short" | "short" => AtomicKind::Short,
            "Integer" | "int" => AtomicKind::Integer,
            "Long" | "long" => AtomicKind::Long,
            "Float" | "float" => AtomicKind::Float,
            "Double" | "double" => AtomicKind::Double,
            "Class" => AtomicKind::Text,
            _ => match erasure {
                "java.math.BigInteger" => AtomicKind::Long,
                "java.math.BigDecimal" => AtomicKind::Double,
                "java.util.Locale"
                | "java.util.UUID"
                | "java.nio.charset.Charset"
                | "java.net.InetAddress"
                | "java.net.URI"
                | "java.net.URL"
                | "java.io.File"
                | "java.nio.file.Path"
                | "java.time.Duration"
                | "java.util.regex.Pattern"
                | "org.springframework.core.io.Resource"
                | "org.springframework.util.MimeType" => AtomicKind::Text,
                _ => return None,
            },
        };
        Some(kind)
    }
}

const LIST_TYPES: &[&str] = &[
    "java.util.List",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.Collection",
    "java.util.Set",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.SortedSet",
    "java.util.TreeSet",
    "java.lang.Iterable",
];

const MAP_TYPES: &[&str] = &[
    "java.util.Map",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.SortedMap",
    "java.util.TreeMap",
    "java.util.concurrent.ConcurrentMap",
    "java.util.concurrent.ConcurrentHashMap",
];

/// What a value bound to a type must look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Atomic(AtomicKind),
    Enum { constants: Vec<String> },
    List { element: TypeRef },
    Map { key: TypeRef, value: TypeRef },
    Bean { properties: Vec<BeanProperty> },
    /// Nothing is known; any value is accepted.
    Unconstrained,
}

impl TypeShape {
    /// Classify `ty`, consulting `catalog` for enums and beans.
    pub fn of(ty: &TypeRef, catalog: &dyn TypeCatalog) -> TypeShape {
        if let Some(element) = ty.component() {
            return TypeShape::List { element };
        }
        if let Some(kind) = AtomicKind::of(&ty.erasure) {
            return TypeShape::Atomic(kind);
        }
        let object = || TypeRef::simple("java.lang.Object");
        if LIST_TYPES.contains(&ty.erasure.as_str()) {
            let element = ty.params.first().cloned().unwrap_or_else(object);
            return TypeShape::List { element };
        }
        if MAP_TYPES.contains(&ty.erasure.as_str()) {
            let key = ty.params.first().cloned().unwrap_or_else(object);
            let value = ty.params.get(1).cloned().unwrap_or_else(object);
            return TypeShape::Map { key, value };
        }
        if ty.erasure == "java.util.Properties" {
            return TypeShape::Map {
                key: TypeRef::simple("java.lang.String"),
                value: TypeRef::simple("java.lang.String"),
            };
        }
        match catalog.resolve(&ty.erasure) {
            Some(TypeDescriptor::Enum { constants }) => TypeShape::Enum { constants },
            Some(TypeDescriptor::Bean { properties }) => TypeShape::Bean { properties },
            None => TypeShape::Unconstrained,
        }
    }

    /// True for shapes written as a single scalar (atomic values, enums).
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeShape::Atomic(_) | TypeShape::Enum { .. })
    }

    /// Values a scalar of this shape can take, when the set is finite.
    pub fn value_choices(&self) -> Vec<String> {
        match self {
            TypeShape::Enum { constants } => constants.clone(),
            TypeShape::Atomic(AtomicKind::Boolean) => vec!["false".into(), "true".into()],
            _ => Vec::new(),
        }
    }
}

/// Name of `ty` as used in "Expecting a '...'" messages.
///
/// Enums list their constants: `demo.Color[RED, GREEN, BLUE]`.
pub fn describe_type(ty: &TypeRef, shape: &TypeShape) -> String {
    match shape {
        TypeShape::Enum { constants } => format!("{ty}[{}]", constants.join(", ")),
        _ => ty.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generic_map() {
        let ty = TypeRef::parse("java.util.Map<java.lang.String,java.lang.String>").unwrap();
        assert_eq!(ty.erasure, "java.util.Map");
        assert_eq!(ty.params.len(), 2);
        assert_eq!(ty.to_string(), "Map<String, String>");
    }

    #[test]
    fn test_parse_nested_and_arrays() {
        let ty = TypeRef::parse("java.util.List<java.util.Map<String, demo.Foo[]>>").unwrap();
        assert_eq!(ty.to_string(), "List<Map<String, demo.Foo[]>>");
        let arr = TypeRef::parse("java.lang.String[][]").unwrap();
        assert_eq!(arr.array_dims, 2);
        assert_eq!(arr.component().unwrap().to_string(), "String[]");
    }

    #[test]
    fn test_parse_wildcards() {
        let ty = TypeRef::parse("java.util.List<? extends demo.Foo>").unwrap();
        assert_eq!(ty.params[0].erasure, "demo.Foo");
        let any = TypeRef::parse("java.util.Map<String, ?>").unwrap();
        assert_eq!(any.params[1].erasure, "java.lang.Object");
    }

    #[test]
    fn test_parse_errors() {
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("java.util.List<String").is_err());
        assert!(TypeRef::parse("java.util.List<String>>").is_err());
        assert!(TypeRef::parse("String[").is_err());
    }

    #[test]
    fn test_display_keeps_other_packages() {
        assert_eq!(TypeRef::simple("java.lang.Integer").to_string(), "Integer");
        assert_eq!(TypeRef::simple("java.util.concurrent.TimeUnit").to_string(), "java.util.concurrent.TimeUnit");
        assert_eq!(TypeRef::simple("demo.Color").to_string(), "demo.Color");
    }

    #[test]
    fn test_atomic_acceptance() {
        assert!(AtomicKind::Integer.accepts("8888"));
        assert!(!AtomicKind::Integer.accepts("not-a-number"));
        assert!(!AtomicKind::Integer.accepts("99999999999"));
        assert!(AtomicKind::Long.accepts("99999999999"));
        assert!(AtomicKind::Boolean.accepts("TRUE"));
        assert!(!AtomicKind::Boolean.accepts("yes"));
        assert!(AtomicKind::Double.accepts("1.5e3"));
        assert!(AtomicKind::Char.accepts("x"));
        assert!(!AtomicKind::Char.accepts("xy"));
        assert!(AtomicKind::Text.accepts("anything at all"));
    }

    #[test]
    fn test_shapes() {
        let catalog = TypeRegistry::new()
            .with_enum("demo.Color", ["RED", "GREEN", "BLUE"])
            .with_bean("demo.Foo", [BeanProperty::new("name", "java.lang.String")]);

        let shape = |name: &str| TypeShape::of(&TypeRef::parse(name).unwrap(), &catalog);

        assert_eq!(shape("int"), TypeShape::Atomic(AtomicKind::Integer));
        assert_eq!(shape("String"), TypeShape::Atomic(AtomicKind::Text));
        assert!(matches!(shape("java.util.Set<demo.Foo>"), TypeShape::List { .. }));
        assert!(matches!(shape("demo.Foo[]"), TypeShape::List { .. }));
        assert!(matches!(shape("java.util.Properties"), TypeShape::Map { .. }));
        assert!(matches!(shape("demo.Foo"), TypeShape::Bean { .. }));
        assert_eq!(shape("demo.Unknown"), TypeShape::Unconstrained);
        assert_eq!(
            shape("demo.Color").value_choices(),
            vec!["RED", "GREEN", "BLUE"]
        );
    }

    #[test]
    fn test_describe_enum() {
        let catalog = TypeRegistry::new().with_enum("demo.Color", ["RED", "GREEN", "BLUE"]);
        let ty = TypeRef::simple("demo.Color");
        let shape = TypeShape::of(&ty, &catalog);
        assert_eq!(describe_type(&ty, &shape), "demo.Color[RED, GREEN, BLUE]");
    }

    #[test]
    fn test_registry_from_json() {
        let json = r#"{
            "demo.Color": {"kind": "enum", "constants": ["RED", "GREEN"]},
            "demo.Foo": {"kind": "bean", "properties": [
                {"name": "initSqls", "type": "java.util.List<java.lang.String>"}
            ]}
        }"#;
        let registry = TypeRegistry::from_json(json).unwrap();
        let foo = registry.resolve("demo.Foo").unwrap();
        let property = foo.bean_property("init-sqls").unwrap();
        assert_eq!(property.name, "initSqls");
        assert_eq!(property.yaml_name(), "init-sqls");
        assert!(foo.bean_property("bogus").is_none());
    }
}
