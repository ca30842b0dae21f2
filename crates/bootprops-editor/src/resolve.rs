//! Resolution of property paths to declared types.

use crate::path::{PathSegment, PropertyPath};
use bootprops_metadata::{
    PropertyIndex, PropertyMetadata, TypeCatalog, TypeRef, TypeShape, canonical_name,
};
use tracing::debug;

/// Render flattened segments the way the index spells paths.
pub(crate) fn render(segments: &[PathSegment]) -> String {
    segments.iter().cloned().collect::<PropertyPath>().to_string()
}

/// The indexed property whose path is the longest prefix of `segments`,
/// with the number of segments it covers.
pub(crate) fn owning_property<'i>(
    index: &'i dyn PropertyIndex,
    segments: &[PathSegment],
) -> Option<(&'i PropertyMetadata, usize)> {
    (1..=segments.len())
        .rev()
        .find_map(|len| index.find_exact(&render(&segments[..len])).map(|p| (p, len)))
}

/// Declared type of a property. Missing or malformed types are unconstrained.
pub(crate) fn declared_type(property: &PropertyMetadata) -> Option<TypeRef> {
    let name = property.type_name.as_deref()?;
    match TypeRef::parse(name) {
        Ok(ty) => Some(ty),
        Err(err) => {
            debug!(property = %property.path, %err, "ignoring unparseable type");
            None
        }
    }
}

/// Follow `segments` from a value of type `ty` into its structure.
///
/// Lists are entered by index (or integer key), maps by any key, beans by
/// property name. A map whose values are scalars absorbs all remaining
/// segments: `logging.level.com.acme` is the `com.acme` key of the
/// `logging.level` map.
pub(crate) fn walk(ty: TypeRef, segments: &[PathSegment], types: &dyn TypeCatalog) -> Option<TypeRef> {
    let mut current = ty;
    for segment in segments {
        current = match (TypeShape::of(&current, types), segment) {
            (TypeShape::List { element }, PathSegment::Index(_)) => element,
            (TypeShape::List { element }, PathSegment::Key(key)) if key.parse::<usize>().is_ok() => {
                element
            }
            (TypeShape::Map { value, .. }, PathSegment::Key(_)) => {
                if TypeShape::of(&value, types).is_scalar() {
                    return Some(value);
                }
                value
            }
            // Nothing is known below an unconstrained value.
            (TypeShape::Unconstrained, _) => return Some(current),
            (TypeShape::Bean { properties }, PathSegment::Key(key)) => {
                let wanted = canonical_name(key);
                let property = properties
                    .iter()
                    .find(|property| canonical_name(&property.name) == wanted)?;
                TypeRef::parse(&property.type_name).ok()?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Type of the value at `path`, if the path leads into an indexed property.
pub(crate) fn type_at(
    path: &PropertyPath,
    index: &dyn PropertyIndex,
    types: &dyn TypeCatalog,
) -> Option<TypeRef> {
    let segments = path.flattened();
    let (property, used) = owning_property(index, &segments)?;
    walk(declared_type(property)?, &segments[used..], types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootprops_metadata::{BeanProperty, MetadataIndex, TypeRegistry};

    fn fixture() -> (MetadataIndex, TypeRegistry) {
        let index = MetadataIndex::new()
            .with(PropertyMetadata::new(
                "logging.level",
                "java.util.Map<java.lang.String,java.lang.String>",
                "",
            ))
            .with(PropertyMetadata::new(
                "volder.foo.list",
                "java.util.List<demo.Foo>",
                "",
            ));
        let types = TypeRegistry::new().with_bean(
            "demo.Foo",
            [
                BeanProperty::new("name", "java.lang.String"),
                BeanProperty::new("roles", "java.util.List<java.lang.String>"),
                BeanProperty::new("nested", "demo.Foo"),
            ],
        );
        (index, types)
    }

    fn type_name(path: PropertyPath) -> Option<String> {
        let (index, types) = fixture();
        type_at(&path, &index, &types).map(|ty| ty.to_string())
    }

    #[test]
    fn test_map_absorbs_dotted_keys() {
        let path = PropertyPath::new().key("logging").key("level").key("com.acme");
        assert_eq!(type_name(path).as_deref(), Some("String"));
    }

    #[test]
    fn test_walk_into_bean_list() {
        let path = PropertyPath::new()
            .key("volder.foo.list")
            .index(0)
            .key("nested")
            .key("roles");
        assert_eq!(type_name(path).as_deref(), Some("List<String>"));

        let integer_key = PropertyPath::new().key("volder.foo.list").key("3").key("init-name");
        assert_eq!(type_name(integer_key), None);
    }

    #[test]
    fn test_unindexed_path() {
        assert_eq!(type_name(PropertyPath::new().key("volder")), None);
    }
}
