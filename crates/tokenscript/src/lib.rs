//! TokenScript: schema-driven parser for blockchain asset definitions.
//!
//! This crate parses TokenScript XML documents into an immutable
//! [`TokenDefinition`] and decodes per-token attributes from it.
//!
//! # Overview
//!
//! A TokenScript document describes one asset class:
//! - **Contracts**: addresses per network, plus event modules
//! - **Attribute types**: how to derive a value from a token id (bitmask),
//!   a contract call, or an event
//! - **Cards**: the token view, item view, global style, and actions
//! - **Labels**: localized, pluralized token names
//!
//! # Quick Start
//!
//! ```rust
//! use alloy_primitives::U256;
//! use tokenscript::{decode_attributes, parse_definition, Locale, ParseOptions};
//!
//! let xml = r#"<ts:token xmlns:ts="http://tokenscript.org/2020/06/tokenscript">
//!   <ts:label><ts:string xml:lang="en">Ticket</ts:string></ts:label>
//!   <ts:attribute-types>
//!     <ts:attribute-type name="seat" syntax="1.3.6.1.4.1.1466.115.121.1.27">
//!       <ts:origins><ts:token-id bitmask="FF00" as="unsigned"/></ts:origins>
//!     </ts:attribute-type>
//!   </ts:attribute-types>
//! </ts:token>"#;
//!
//! let options = ParseOptions::new(Locale::new("en").unwrap());
//! let definition = parse_definition(xml, &options).unwrap();
//! assert_eq!(definition.token_name(1), Some("Ticket"));
//!
//! let decoded = decode_attributes(&definition, U256::from(0x2A00u64), None);
//! assert_eq!(decoded[0].text, "42");
//! ```
//!
//! # Modules
//!
//! - [`model`]: Definition types (contracts, attribute types, actions, views)
//! - [`parse`]: Document parsing and namespace/locale negotiation
//! - [`decode`]: Per-token attribute decoding
//! - [`xml`]: Namespace-resolved element tree
//! - [`error`]: Error types
//! - [`limits`]: Input limits for parsing
//!
//! # Concurrency
//!
//! Parsing is a single synchronous pass. A parsed [`TokenDefinition`] is
//! read-only and `Send + Sync`; decoding takes `&TokenDefinition` and
//! shares no state between calls.

pub mod decode;
pub mod error;
pub mod limits;
pub mod model;
pub mod parse;
pub mod util;
pub mod xml;

// Re-export commonly used types at crate root
pub use decode::{
    decode_attribute, decode_attributes, DecodeStatus, DecodedAttribute, FunctionResults,
    UNSUPPORTED_ENCODING,
};
pub use error::{DecodeFault, ParseError, ParseStatus};
pub use model::{
    Action, As, AttributeType, BitField, ContractInfo, EventDefinition, EventModule,
    FunctionDefinition, MethodArg, Origin, Reference, Syntax, TokenDefinition, TokenNames,
    TransactionPayload, View, ViewHolder, DEFAULT_NETWORK,
};
pub use parse::{
    parse_definition, parse_definition_bytes, parse_definition_for_language, Locale, ParseOptions,
    SchemaVersion,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// TokenScript schema version (`YYYY/MM`) this parser implements.
pub const CURRENT_SCHEMA: &str = "2020/06";

/// Base URL that every TokenScript namespace starts with.
pub const TOKENSCRIPT_BASE_URL: &str = "http://tokenscript.org/";

/// Namespace of the schema version this parser implements.
pub const TOKENSCRIPT_NAMESPACE: &str = "http://tokenscript.org/2020/06/tokenscript";

/// Namespace assumed when a document declares no TokenScript namespace.
pub const ATTESTATION_NAMESPACE: &str = "http://attestation.id/ns/tbml";

/// XML digital signature namespace.
pub const XMLDSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";
