//! XML response handling for the SimpleDB client.
//!
//! SimpleDB answers every request with an XML document. This crate parses
//! those documents into a neutral tree and flattens the tree into plain nested
//! objects, so callers can work with `{"DomainName": ["a", "b"]}` instead of
//! walking elements.
//!
//! # Key components
//!
//! - [`ParseNode`] and [`parse_document`] for building a tree from raw bytes
//! - [`FlatValue`], [`Flattener`], [`flatten`] and [`flatten_document`] for
//!   turning a tree into objects, lists and text
//! - [`read_object`] for doing both in one step
//!
//! # Flattening conventions
//!
//! - Repeated sibling fields fold into a list starting at the second occurrence
//! - Text next to attributes or children lives under [`TEXT_FIELD`] (`#text`)
//! - Empty elements become empty objects

pub mod error;
pub mod flatten;
pub mod tree;

pub use error::XmlError;
pub use flatten::{
    DEFAULT_MAX_DEPTH, FlatObject, FlatValue, Flattener, TEXT_FIELD, flatten, flatten_document,
    insert_folded, read_object,
};
pub use tree::{ParseNode, parse_document, parse_document_with_max_depth};
