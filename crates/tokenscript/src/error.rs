//! Error types for TokenScript parsing and attribute decoding.

use thiserror::Error;

/// Outcome of schema version negotiation (see [`crate::parse::namespace`]).
///
/// Advisory: only [`ParseStatus::ParseFailed`] and
/// [`ParseStatus::ParserOutOfDate`] make a document unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParseStatus {
    /// Document schema matches the parser schema.
    #[default]
    Ok,
    /// Document uses an older schema; still parsed.
    XmlOutOfDate,
    /// Document uses a newer schema than this parser understands.
    ParserOutOfDate,
    /// Namespace version segment is malformed.
    ParseFailed,
}

impl ParseStatus {
    /// Returns the status code string (e.g., "XML_OUT_OF_DATE").
    pub fn code(&self) -> &'static str {
        match self {
            ParseStatus::Ok => "OK",
            ParseStatus::XmlOutOfDate => "XML_OUT_OF_DATE",
            ParseStatus::ParserOutOfDate => "PARSER_OUT_OF_DATE",
            ParseStatus::ParseFailed => "PARSE_FAILED",
        }
    }

    /// Returns true if a document with this status may be used.
    pub fn is_usable(&self) -> bool {
        matches!(self, ParseStatus::Ok | ParseStatus::XmlOutOfDate)
    }
}

/// Error while parsing a TokenScript document.
///
/// Any of these aborts the parse; no partially built definition is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid locale {locale:?}: expected a 2 or 3 letter ISO 639 language code")]
    InvalidLocale { locale: String },

    #[error("unknown tag <{tag}> in {scope}")]
    SchemaViolation { tag: String, scope: String },

    #[error("deprecated <{tag}> used in {scope}, replace with <{replacement}>")]
    DeprecatedFeature {
        tag: String,
        scope: String,
        replacement: &'static str,
    },

    #[error("duplicate module label: {label}")]
    DuplicateModuleLabel { label: String },

    #[error("module in contract {contract:?} requires a label")]
    MissingModuleLabel { contract: String },

    #[error("<{parent}> requires a child element")]
    MissingElement { parent: String },

    #[error("invalid number {value:?} in {field}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} {len} exceeds maximum {max}")]
    LimitExceeded {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("document is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

/// Failure to decode a single attribute.
///
/// Decode faults are recovered per attribute and reported through
/// [`crate::decode::DecodeStatus::Failed`]; they never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFault {
    #[error("no result supplied for function {method:?}")]
    MissingResult { method: String },

    #[error("malformed numeric result {text:?}")]
    MalformedNumber { text: String },

    #[error("value has no entry in the mapping table")]
    UnknownMappingKey,

    #[error("value is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid GeneralizedTime value {text:?}")]
    InvalidTime { text: String },

    #[error("value overflows {context}")]
    Overflow { context: &'static str },
}
