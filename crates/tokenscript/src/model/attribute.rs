//! Attribute types: typed rules for deriving a value for a token.
//!
//! An attribute value comes from exactly one [`Origin`]: a bit field of the
//! token id (optionally mapped through an enumeration table), a contract
//! call, an event, or user entry.

use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::model::{EventDefinition, FunctionDefinition};

/// LDAP attribute syntax (RFC 4517), identified by OID in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    #[default]
    DirectoryString,
    IA5String,
    Integer,
    GeneralizedTime,
    Boolean,
    BitString,
    CountryString,
    Jpeg,
    NumericString,
}

impl Syntax {
    /// Common prefix of all syntax OIDs.
    pub const OID_PREFIX: &'static str = "1.3.6.1.4.1.1466.115.121.1.";

    /// Creates a Syntax from its OID (e.g. `1.3.6.1.4.1.1466.115.121.1.27`).
    pub fn from_oid(oid: &str) -> Option<Syntax> {
        match oid.trim().strip_prefix(Self::OID_PREFIX)? {
            "6" => Some(Syntax::BitString),
            "7" => Some(Syntax::Boolean),
            "11" => Some(Syntax::CountryString),
            "15" => Some(Syntax::DirectoryString),
            "24" => Some(Syntax::GeneralizedTime),
            "26" => Some(Syntax::IA5String),
            "27" => Some(Syntax::Integer),
            "28" => Some(Syntax::Jpeg),
            "36" => Some(Syntax::NumericString),
            _ => None,
        }
    }
}

/// How a raw value is interpreted (the `as` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum As {
    Signed,
    Unsigned,
    #[default]
    Utf8,
    Bytes,
    E2,
    E4,
    E6,
    E8,
    E18,
    Boolean,
    Mapping,
    Address,
}

impl As {
    /// Parses an `as` attribute value (case-insensitive).
    ///
    /// Empty means UTF-8; unrecognized values mean unsigned.
    pub fn parse(value: &str) -> As {
        match value.trim().to_ascii_lowercase().as_str() {
            "signed" => As::Signed,
            "string" | "utf8" | "" => As::Utf8,
            "bytes" => As::Bytes,
            "e18" => As::E18,
            "e8" => As::E8,
            "e6" => As::E6,
            "e4" => As::E4,
            "e2" => As::E2,
            "bool" | "boolean" => As::Boolean,
            "mapping" => As::Mapping,
            "address" => As::Address,
            _ => As::Unsigned,
        }
    }

    /// Returns the decimal scale for the `eN` kinds.
    pub fn decimals(self) -> Option<usize> {
        match self {
            As::E2 => Some(2),
            As::E4 => Some(4),
            As::E6 => Some(6),
            As::E8 => Some(8),
            As::E18 => Some(18),
            _ => None,
        }
    }
}

/// A fixed-width sub-field of a 256-bit token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    pub mask: U256,
    /// Number of trailing zero bits in `mask`.
    pub shift: usize,
}

impl BitField {
    /// Creates a field from its mask, deriving the shift.
    pub fn from_mask(mask: U256) -> Self {
        let shift = if mask.is_zero() { 0 } else { mask.trailing_zeros() };
        Self { mask, shift }
    }

    /// Parses a hex mask as written in documents (optional `0x`).
    pub fn parse_mask(text: &str) -> Option<Self> {
        let digits = strip_hex_prefix(text.trim());
        if digits.is_empty() {
            return None;
        }
        U256::from_str_radix(digits, 16).ok().map(Self::from_mask)
    }

    /// Extracts the field value: `(token_id & mask) >> shift`.
    pub fn extract(&self, token_id: U256) -> U256 {
        (token_id & self.mask) >> self.shift
    }

    /// Places a value into the field: `(value << shift) & mask`.
    pub fn embed(&self, value: U256) -> U256 {
        (value << self.shift) & self.mask
    }

    /// Width of the field in bits.
    pub fn width(&self) -> usize {
        (self.mask >> self.shift).bit_len()
    }
}

/// Strips a leading `0x` or `0X` from hex text.
pub(crate) fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

/// Where an attribute's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    /// Bit field of the token id.
    TokenId(BitField),
    /// Bit field of the token id, looked up in an enumeration table.
    Mapping {
        field: BitField,
        /// Raw field value to localized display string.
        members: BTreeMap<U256, String>,
    },
    /// Result of a contract call, resolved outside the parser.
    Function(FunctionDefinition),
    /// Value selected from an event.
    Event(EventDefinition),
    /// Value typed in by the user (action inputs).
    UserEntry,
    /// No origin declared.
    Unresolved,
}

/// A named, typed rule for deriving one attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeType {
    pub name: String,
    /// Localized display label.
    pub label: String,
    pub syntax: Syntax,
    pub value_as: As,
    pub origin: Origin,
}

impl AttributeType {
    /// Returns the bit field for token-id and mapping origins.
    pub fn bit_field(&self) -> Option<&BitField> {
        match &self.origin {
            Origin::TokenId(field) | Origin::Mapping { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns the function for call-backed attributes.
    pub fn function(&self) -> Option<&FunctionDefinition> {
        match &self.origin {
            Origin::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the enumeration table, keyed by raw field value.
    pub fn members(&self) -> Option<&BTreeMap<U256, String>> {
        match &self.origin {
            Origin::Mapping { members, .. } => Some(members),
            _ => None,
        }
    }

    /// Returns the enumeration table keyed as the value is stored in a
    /// token id, i.e. `(key << shift) & mask`.
    pub fn converted_members(&self) -> Option<BTreeMap<U256, String>> {
        match &self.origin {
            Origin::Mapping { field, members } => Some(
                members
                    .iter()
                    .map(|(key, value)| (field.embed(*key), value.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Returns true if the attribute can be kept in the global registry:
    /// it needs a bit mask or a function.
    pub fn has_global_origin(&self) -> bool {
        matches!(
            self.origin,
            Origin::TokenId(_) | Origin::Mapping { .. } | Origin::Function(_)
        )
    }
}
