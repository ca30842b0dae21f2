//! # bootprops-yaml
//!
//! YAML parsing with source range tracking.
//!
//! This crate turns configuration text into a tree of [`YamlNode`]s (mapping,
//! sequence, scalar) where every node, and every mapping key, knows the byte
//! range it was parsed from. The editor features built on top of it
//! (reconciliation, hovers) use those ranges to anchor their results in the
//! original document.
//!
//! ## Design
//!
//! Parsing is event based: a `MarkedEventReceiver` consumes yaml-rust2 parser
//! events and assembles owned nodes. yaml-rust2 only reports start markers,
//! so node ends are recovered from the source text (closing quotes, block
//! scalar indentation, last child of a collection).
//!
//! ## Example
//!
//! ```rust
//! use bootprops_yaml::{parse, NodeKind};
//!
//! let content = "server:\n  port: 8888\n";
//! let yaml = parse(content).unwrap();
//! let server = yaml.get("server").unwrap();
//! assert_eq!(server.kind(), NodeKind::Mapping);
//! assert_eq!(server.range.slice(content), "port: 8888");
//! ```

mod error;
mod node;
mod parser;
mod source_range;

pub use error::{Error, Result};
pub use node::{MappingEntry, NodeKind, NodeValue, Scalar, ScalarStyle, YamlNode};
pub use parser::{parse, parse_documents};
pub use source_range::SourceRange;
