//! Locales used to pick localized client properties.

use std::fmt;

/// A language with an optional country, such as `en` or `fr_CA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Create a locale from a language and optional country code.
    pub fn new(language: impl Into<String>, country: Option<String>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            country: country
                .filter(|c| !c.is_empty())
                .map(|c| c.to_uppercase()),
        }
    }

    /// Parse `ll`, `ll_CC` or `ll-CC`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.split_once(['_', '-']) {
            Some((language, country)) => Self::new(language, Some(country.to_string())),
            None => Self::new(text, None),
        }
    }

    /// The language code.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The country code.
    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Keys to try for a localized property, most specific first.
    #[must_use]
    pub fn lookup_keys(&self, key: &str) -> Vec<String> {
        let mut keys = Vec::with_capacity(3);
        if self.language.is_empty() {
            keys.push(key.to_string());
            return keys;
        }
        if let Some(country) = &self.country {
            keys.push(format!("{key}_{}_{country}", self.language));
        }
        keys.push(format!("{key}_{}", self.language));
        keys.push(key.to_string());
        keys
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en", None)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{country}", self.language),
            None => f.write_str(&self.language),
        }
    }
}
