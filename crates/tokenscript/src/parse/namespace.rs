//! Schema version negotiation.
//!
//! A TokenScript namespace has the form
//! `http://tokenscript.org/YYYY/MM/<name>`. The `YYYY/MM` segment is the
//! schema version the document was written against.

use std::fmt;

use crate::error::ParseStatus;
use crate::xml::Element;
use crate::{ATTESTATION_NAMESPACE, TOKENSCRIPT_BASE_URL};

/// A schema version, ordered by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub year: u16,
    pub month: u8,
}

impl SchemaVersion {
    /// The schema version this parser implements.
    pub const CURRENT: SchemaVersion = SchemaVersion { year: 2020, month: 6 };

    /// Parses a `YYYY/MM` segment. Exactly 7 characters, month 01-12.
    pub fn parse(segment: &str) -> Option<Self> {
        let bytes = segment.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'/' {
            return None;
        }
        let (year, month) = (&segment[..4], &segment[5..]);
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: u16 = year.parse().ok()?;
        let month: u8 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

/// Outcome of namespace resolution for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceResolution {
    /// Namespace to parse under; `None` if the document was rejected.
    pub namespace: Option<String>,
    pub status: ParseStatus,
}

/// Resolves the document namespace from the root element's attributes.
///
/// The first attribute value (namespace declarations included) containing
/// the TokenScript base URL decides. Without one, the attestation
/// namespace is assumed.
pub fn resolve_namespace(root: &Element) -> NamespaceResolution {
    root.attributes
        .iter()
        .find(|a| a.value.contains(TOKENSCRIPT_BASE_URL))
        .map(|a| classify(&a.value))
        .unwrap_or_else(|| NamespaceResolution {
            namespace: Some(ATTESTATION_NAMESPACE.to_string()),
            status: ParseStatus::Ok,
        })
}

/// Classifies one namespace value that contains the base URL.
pub fn classify(value: &str) -> NamespaceResolution {
    let version = value.find(TOKENSCRIPT_BASE_URL).and_then(|start| {
        let date_start = start + TOKENSCRIPT_BASE_URL.len();
        let date_end = value.rfind('/')?;
        if date_end < date_start {
            return None;
        }
        SchemaVersion::parse(&value[date_start..date_end])
    });

    let Some(version) = version else {
        return NamespaceResolution {
            namespace: None,
            status: ParseStatus::ParseFailed,
        };
    };

    match version.cmp(&SchemaVersion::CURRENT) {
        std::cmp::Ordering::Equal => NamespaceResolution {
            namespace: Some(value.to_string()),
            status: ParseStatus::Ok,
        },
        std::cmp::Ordering::Less => NamespaceResolution {
            namespace: Some(value.to_string()),
            status: ParseStatus::XmlOutOfDate,
        },
        std::cmp::Ordering::Greater => NamespaceResolution {
            namespace: None,
            status: ParseStatus::ParserOutOfDate,
        },
    }
}
