//! Locale handling and localized element selection.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::xml::Element;

/// The active language, an ISO 639 code of 2 or 3 letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
}

impl Locale {
    /// Creates a locale from a bare language code (`en`, `zh`, `fil`).
    pub fn new(language: &str) -> Result<Self, ParseError> {
        let valid = (2..=3).contains(&language.len())
            && language.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            return Err(ParseError::InvalidLocale {
                locale: language.to_string(),
            });
        }
        Ok(Self {
            language: language.to_ascii_lowercase(),
        })
    }

    /// Creates a locale from a language tag such as `en-US` or `zh_TW`,
    /// keeping only the primary language subtag.
    pub fn from_tag(tag: &str) -> Result<Self, ParseError> {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        Self::new(primary).map_err(|_| ParseError::InvalidLocale {
            locale: tag.to_string(),
        })
    }

    /// Returns the lower-case language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns true if a `lang` attribute value names this locale's language.
    fn matches(&self, lang: &str) -> bool {
        let primary = lang.split(['-', '_']).next().unwrap_or_default();
        primary.eq_ignore_ascii_case(&self.language)
    }

    /// Picks the best element for this locale from same-named siblings.
    ///
    /// Order of preference: exact language match; the first element with
    /// no language or `en`; the first element.
    pub fn select<'a>(&self, candidates: impl IntoIterator<Item = &'a Element>) -> Option<&'a Element> {
        let mut neutral = None;
        let mut first = None;
        for element in candidates {
            let lang = element.lang();
            if self.matches(lang) {
                return Some(element);
            }
            if neutral.is_none() && (lang.is_empty() || lang.eq_ignore_ascii_case("en")) {
                neutral = Some(element);
            }
            if first.is_none() {
                first = Some(element);
            }
        }
        neutral.or(first)
    }

    /// Text of the best localized child named `tag`, trimmed.
    pub fn localized_text(&self, container: &Element, tag: &str) -> Option<String> {
        self.select(container.elements_named(tag))
            .map(|e| e.text_content().trim().to_string())
    }

    /// Text of a label-like element: the best localized child element if
    /// it has any, otherwise its own text.
    pub fn label_text(&self, label: &Element) -> Option<String> {
        let text = match self.select(label.elements()) {
            Some(child) => child.text_content(),
            None => label.text_content(),
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

impl FromStr for Locale {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)
    }
}
