//! Locales
//!
//! A minimal language/region locale and the fallback rules used to pick a
//! localized message variant.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    /// Pattern for `language[-region]` tags
    static ref LOCALE_TAG: Regex =
        Regex::new(r"^(?:([A-Za-z]{2,3})(?:[-_]([A-Za-z]{2}|[0-9]{3}))?)?$").unwrap();
}

/// Languages writing a comma as decimal separator.
const COMMA_DECIMAL_LANGUAGES: &[&str] = &[
    "bg", "cs", "da", "de", "el", "es", "fi", "fr", "hr", "hu", "id", "it", "nb", "nl", "no",
    "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "tr", "uk",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid locale tag '{0}'")]
pub struct LocaleError(pub String);

/// Language with an optional region. The root locale has an empty language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    pub const fn root() -> Self {
        Locale {
            language: String::new(),
            region: None,
        }
    }

    pub fn new(language: &str, region: Option<&str>) -> Self {
        Locale {
            language: language.to_ascii_lowercase(),
            region: region
                .filter(|r| !r.is_empty())
                .map(|r| r.to_ascii_uppercase()),
        }
    }

    /// Parses `en`, `en-US` or `en_US`. The empty string and `root` give the root locale.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("root") {
            return Ok(Locale::root());
        }

        let captures = LOCALE_TAG
            .captures(tag)
            .ok_or_else(|| LocaleError(tag.to_string()))?;

        Ok(Locale::new(
            captures.get(1).map_or("", |m| m.as_str()),
            captures.get(2).map(|m| m.as_str()),
        ))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.language.is_empty()
    }

    /// Locale without its region
    pub fn language_only(&self) -> Locale {
        Locale {
            language: self.language.clone(),
            region: None,
        }
    }

    pub fn decimal_separator(&self) -> char {
        if COMMA_DECIMAL_LANGUAGES.contains(&self.language.as_str()) {
            ','
        } else {
            '.'
        }
    }

    /// Name used in diagnostics.
    pub fn display_name(&self) -> String {
        if self.is_root() {
            "ROOT".to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{}", self.language, region),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

/// Picks the variant best matching `locale`: exact language and region first,
/// then a variant of the same language (one without region preferred), then the
/// root variant and finally the first declared variant.
pub fn select_variant<'a, T>(variants: &'a [(Locale, T)], locale: &Locale) -> Option<&'a T> {
    let (_, first) = variants.first()?;

    if let Some((_, exact)) = variants.iter().find(|(l, _)| l == locale) {
        return Some(exact);
    }

    if !locale.is_root() {
        let mut same_language = None;

        for (variant, value) in variants {
            if variant.language == locale.language {
                if variant.region.is_none() {
                    tracing::trace!(requested = %locale, selected = %variant, "language fallback");
                    return Some(value);
                }
                same_language.get_or_insert((variant, value));
            }
        }

        if let Some((variant, value)) = same_language {
            tracing::trace!(requested = %locale, selected = %variant, "language fallback");
            return Some(value);
        }
    }

    if let Some((_, root)) = variants.iter().find(|(l, _)| l.is_root()) {
        return Some(root);
    }

    tracing::trace!(requested = %locale, "no locale match, using first variant");
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locales(tags: &[&str]) -> Vec<(Locale, &'static str)> {
        let names = ["a", "b", "c", "d", "e"];
        tags.iter()
            .zip(names)
            .map(|(tag, name)| (Locale::parse(tag).unwrap(), name))
            .collect()
    }

    #[test]
    fn test_parse() {
        let locale = Locale::parse("en_us").unwrap();
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.region(), Some("US"));
        assert_eq!(locale.to_string(), "en-US");
        assert!(Locale::parse("").unwrap().is_root());
        assert!(Locale::parse("root").unwrap().is_root());
        assert!(Locale::parse("english").is_err());
    }

    #[test]
    fn test_select_exact_then_language() {
        let variants = locales(&["en-US", "nl", "en-GB", "de-DE"]);
        assert_eq!(select_variant(&variants, &Locale::parse("en-GB").unwrap()), Some(&"c"));
        assert_eq!(select_variant(&variants, &Locale::parse("nl-BE").unwrap()), Some(&"b"));
        assert_eq!(select_variant(&variants, &Locale::parse("de").unwrap()), Some(&"d"));
    }

    #[test]
    fn test_select_root_then_first() {
        let variants = locales(&["en-US", "", "de"]);
        assert_eq!(select_variant(&variants, &Locale::parse("zh").unwrap()), Some(&"b"));

        let variants = locales(&["en-US", "nl"]);
        assert_eq!(select_variant(&variants, &Locale::parse("zh").unwrap()), Some(&"a"));

        let empty: Vec<(Locale, &str)> = Vec::new();
        assert_eq!(select_variant(&empty, &Locale::root()), None);
    }

    #[test]
    fn test_decimal_separator() {
        assert_eq!(Locale::parse("de-DE").unwrap().decimal_separator(), ',');
        assert_eq!(Locale::parse("en").unwrap().decimal_separator(), '.');
    }
}
