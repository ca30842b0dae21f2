//! # bootprops-metadata
//!
//! The knowledge side of the configuration editor.
//!
//! - [`PropertyIndex`] answers "which properties exist below this path", with
//!   [`MetadataIndex`] as the in-memory implementation loaded from a
//!   configuration-metadata JSON document.
//! - [`TypeCatalog`] describes the enums and beans that property types refer
//!   to; [`TypeShape`] combines it with the builtin knowledge of atomic,
//!   collection and map types.
//!
//! ## Example
//!
//! ```rust
//! use bootprops_metadata::{MetadataIndex, PropertyIndex, PropertyMetadata};
//!
//! let index = MetadataIndex::new()
//!     .with(PropertyMetadata::new("server.port", "java.lang.Integer", "Server HTTP port"));
//! assert!(index.find_exact("server.port").is_some());
//! assert_eq!(index.find_with_prefix("server.").len(), 1);
//! ```

mod error;
mod index;
mod property;
mod types;

pub use error::{Error, Result};
pub use index::{MetadataIndex, PropertyIndex};
pub use property::{
    Deprecation, PropertyMetadata, ValueHint, camel_case, canonical_name, kebab_case,
};
pub use types::{
    AtomicKind, BeanProperty, EmptyCatalog, TypeCatalog, TypeDescriptor, TypeRef, TypeRegistry,
    TypeShape, describe_type,
};
