//! Input limits for parsing untrusted documents.
//!
//! These are defaults for [`crate::ParseOptions`]; callers may tighten or
//! relax them per parse.

/// Maximum document size in bytes (4 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 4 * 1024 * 1024;

/// Maximum element nesting depth.
pub const MAX_ELEMENT_DEPTH: usize = 64;

/// Maximum number of attributes on a single element.
pub const MAX_ATTRIBUTES_PER_ELEMENT: usize = 256;
