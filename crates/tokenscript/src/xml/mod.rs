//! XML input layer.
//!
//! Turns document text into a generic, namespace-resolved element tree.

pub mod tree;

pub use tree::{parse_document, Attribute, Descendants, Document, Element, Node};
