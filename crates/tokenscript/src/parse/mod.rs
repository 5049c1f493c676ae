//! TokenScript document parsing.
//!
//! Parsing is a single pass over a namespace-resolved element tree. The
//! document's schema version is negotiated first; documents in an
//! unsupported legacy format yield an empty definition rather than an
//! error.

mod attribute;
mod card;
mod context;
mod contract;
mod document;
mod function;
pub mod locale;
pub mod namespace;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{ParseError, ParseStatus};
use crate::limits::{MAX_DOCUMENT_SIZE, MAX_ELEMENT_DEPTH};
use crate::model::TokenDefinition;
use crate::xml::parse_document;

pub use locale::Locale;
pub use namespace::{resolve_namespace, NamespaceResolution, SchemaVersion};

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Language used to pick localized strings.
    pub locale: Locale,
    /// Maximum document size in bytes.
    pub max_document_size: usize,
    /// Maximum element nesting depth.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl ParseOptions {
    /// Creates options for a locale with default limits.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            max_document_size: MAX_DOCUMENT_SIZE,
            max_depth: MAX_ELEMENT_DEPTH,
        }
    }

    /// Sets the maximum document size in bytes.
    pub fn max_document_size(mut self, size: usize) -> Self {
        self.max_document_size = size;
        self
    }

    /// Sets the maximum element nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Parses a TokenScript document.
pub fn parse_definition(xml: &str, options: &ParseOptions) -> Result<TokenDefinition, ParseError> {
    parse_definition_bytes(xml.as_bytes(), options)
}

/// Parses a TokenScript document for a language code, validating the code
/// before the document is touched.
pub fn parse_definition_for_language(xml: &str, language: &str) -> Result<TokenDefinition, ParseError> {
    let options = ParseOptions::new(Locale::new(language)?);
    parse_definition(xml, &options)
}

/// Parses a TokenScript document from raw bytes, which must be UTF-8.
pub fn parse_definition_bytes(input: &[u8], options: &ParseOptions) -> Result<TokenDefinition, ParseError> {
    if input.len() > options.max_document_size {
        return Err(ParseError::LimitExceeded {
            field: "document size",
            len: input.len(),
            max: options.max_document_size,
        });
    }
    let xml = std::str::from_utf8(input).map_err(|_| ParseError::InvalidUtf8)?;

    let hash = Sha256::digest(input);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hash);

    let document = parse_document(xml, options.max_depth)?;

    let NamespaceResolution { namespace, status } = resolve_namespace(&document.root);
    if status != ParseStatus::Ok {
        warn!(status = status.code(), "document schema version differs from parser");
    }

    let supported = namespace
        .as_deref()
        .is_some_and(|ns| document::has_token_element(&document, ns));
    if !supported {
        debug!(namespace = ?namespace, "no token element in a supported namespace");
        return Ok(TokenDefinition::empty(options.locale.clone(), namespace, status, digest));
    }

    let mut ctx = context::ParseContext::new(&options.locale);
    document::parse_root(&document.root, &mut ctx)?;
    let key_name = document::find_key_name(&document);

    Ok(ctx.finish(namespace, status, key_name, digest))
}
