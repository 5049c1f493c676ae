//! Per-token attribute decoding.
//!
//! Decoding reads a parsed [`TokenDefinition`] and never mutates it. Each
//! attribute is decoded independently: a failure degrades that attribute
//! to the [`UNSUPPORTED_ENCODING`] placeholder and leaves the rest intact.

pub mod render;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use alloy_primitives::U256;

use crate::error::DecodeFault;
use crate::model::attribute::strip_hex_prefix;
use crate::model::{AttributeType, Origin, Syntax, TokenDefinition};

pub use render::render;

/// Placeholder text for attributes that could not be decoded.
pub const UNSUPPORTED_ENCODING: &str = "unsupported encoding";

/// Results of contract calls, keyed by method name, supplied by the caller.
pub trait FunctionResults {
    /// Returns the raw result text for a method.
    fn result(&self, method: &str) -> Option<&str>;
}

impl<S: BuildHasher> FunctionResults for HashMap<String, String, S> {
    fn result(&self, method: &str) -> Option<&str> {
        self.get(method).map(String::as_str)
    }
}

impl FunctionResults for BTreeMap<String, String> {
    fn result(&self, method: &str) -> Option<&str> {
        self.get(method).map(String::as_str)
    }
}

/// How an attribute's value was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStatus {
    Decoded,
    /// The value comes from outside the token id and was not supplied.
    Deferred,
    Failed(DecodeFault),
}

impl DecodeStatus {
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeStatus::Decoded)
    }
}

/// One decoded attribute of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttribute {
    pub name: String,
    pub label: String,
    pub value: U256,
    /// Display text, or [`UNSUPPORTED_ENCODING`] unless decoded.
    pub text: String,
    pub status: DecodeStatus,
}

impl DecodedAttribute {
    fn new(attribute: &AttributeType, value: U256, text: String, status: DecodeStatus) -> Self {
        Self {
            name: attribute.name.clone(),
            label: attribute.label.clone(),
            value,
            text,
            status,
        }
    }

    fn placeholder(attribute: &AttributeType, value: U256, status: DecodeStatus) -> Self {
        Self::new(attribute, value, UNSUPPORTED_ENCODING.to_string(), status)
    }
}

/// Decodes one attribute for a token.
pub fn decode_attribute(
    attribute: &AttributeType,
    token_id: U256,
    results: Option<&dyn FunctionResults>,
) -> DecodedAttribute {
    match &attribute.origin {
        Origin::TokenId(field) | Origin::Mapping { field, .. } => {
            let value = field.extract(token_id);
            match render(attribute, field, value) {
                Ok(text) => DecodedAttribute::new(attribute, value, text, DecodeStatus::Decoded),
                Err(fault) => DecodedAttribute::placeholder(attribute, value, DecodeStatus::Failed(fault)),
            }
        }
        Origin::Function(function) => {
            let Some(results) = results else {
                return DecodedAttribute::placeholder(attribute, U256::ZERO, DecodeStatus::Deferred);
            };
            let Some(text) = results.result(&function.method) else {
                let fault = DecodeFault::MissingResult {
                    method: function.method.clone(),
                };
                return DecodedAttribute::placeholder(attribute, U256::ZERO, DecodeStatus::Failed(fault));
            };
            match function_value(attribute.syntax, text) {
                Ok(value) => DecodedAttribute::new(attribute, value, text.to_string(), DecodeStatus::Decoded),
                Err(fault) => DecodedAttribute::placeholder(attribute, U256::ZERO, DecodeStatus::Failed(fault)),
            }
        }
        Origin::Event(_) | Origin::UserEntry | Origin::Unresolved => {
            DecodedAttribute::placeholder(attribute, U256::ZERO, DecodeStatus::Deferred)
        }
    }
}

/// Decodes every global attribute of a definition for a token, sorted by
/// attribute name.
pub fn decode_attributes(
    definition: &TokenDefinition,
    token_id: U256,
    results: Option<&dyn FunctionResults>,
) -> Vec<DecodedAttribute> {
    let mut attributes: Vec<&AttributeType> = definition.attribute_types().values().collect();
    attributes.sort_by(|a, b| a.name.cmp(&b.name));
    attributes
        .into_iter()
        .map(|attribute| decode_attribute(attribute, token_id, results))
        .collect()
}

/// Numeric value of a call result. Only NumericString results carry one;
/// they are hex, with or without a `0x`/`0X` prefix.
fn function_value(syntax: Syntax, text: &str) -> Result<U256, DecodeFault> {
    if syntax != Syntax::NumericString {
        return Ok(U256::ZERO);
    }
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty() {
        return Err(DecodeFault::MalformedNumber {
            text: text.to_string(),
        });
    }
    U256::from_str_radix(digits, 16).map_err(|_| DecodeFault::MalformedNumber {
        text: text.to_string(),
    })
}
