//! Pluralized token names.

use std::collections::BTreeMap;

/// Token names keyed by plural quantity (`one`, `two`, `other`, or "" for
/// the untagged default).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenNames {
    names: BTreeMap<String, String>,
}

impl TokenNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name for a quantity, replacing any earlier one.
    pub fn insert(&mut self, quantity: impl Into<String>, name: impl Into<String>) {
        self.names.insert(quantity.into(), name.into());
    }

    /// Returns the name for a quantity key.
    pub fn get(&self, quantity: &str) -> Option<&str> {
        self.names.get(quantity).map(String::as_str)
    }

    /// Returns the name to show for `count` tokens.
    ///
    /// 1 prefers `one` then the default; 2 prefers `two` then `other`; any
    /// other count uses `other`. If nothing matches, any available name is
    /// returned.
    pub fn for_count(&self, count: u64) -> Option<&str> {
        let found = match count {
            1 => self.get("one").or_else(|| self.get("")),
            2 => self.get("two").or_else(|| self.get("other")),
            _ => self.get("other"),
        };
        found.or_else(|| self.names.values().next().map(String::as_str))
    }
}
