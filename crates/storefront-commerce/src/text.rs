//! Localized display text and variant selections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale used when a plain string arrives where localized text is expected.
pub const DEFAULT_LOCALE: &str = "en";

/// Text with one entry per supported locale, e.g. `{"en": "Red", "ar": "أحمر"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TextRepr")]
pub struct LocalizedText(BTreeMap<String, String>);

/// Stored carts written by older clients sometimes hold a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextRepr {
    Localized(BTreeMap<String, String>),
    Plain(String),
}

impl From<TextRepr> for LocalizedText {
    fn from(repr: TextRepr) -> Self {
        match repr {
            TextRepr::Localized(map) => Self(map),
            TextRepr::Plain(text) => Self::new(DEFAULT_LOCALE, text),
        }
    }
}

impl LocalizedText {
    /// Text with a single locale entry.
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(locale.into(), text.into());
        Self(map)
    }

    /// Add or replace a locale entry.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Text for `locale`, if present.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Text for `locale`, falling back to the default locale and then to
    /// any entry at all.
    pub fn display(&self, locale: &str) -> &str {
        self.get(locale)
            .or_else(|| self.get(DEFAULT_LOCALE))
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or("")
    }

    /// Iterate over `(locale, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Locale-aware equality.
    ///
    /// Every locale present on either side must carry the same text once
    /// trimmed and compared case-insensitively. A locale missing on one side
    /// reads as empty text.
    pub fn matches(&self, other: &LocalizedText) -> bool {
        self.0
            .keys()
            .chain(other.0.keys())
            .all(|locale| normalize(self.get(locale)) == normalize(other.get(locale)))
    }
}

fn normalize(text: Option<&str>) -> String {
    text.unwrap_or("").trim().to_lowercase()
}

/// One chosen value on a variant axis (e.g. color = red).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVariant {
    /// Variant axis name, e.g. "color".
    pub variant: String,
    /// Chosen value, localized.
    pub value: LocalizedText,
}

impl SelectedVariant {
    pub fn new(variant: impl Into<String>, value: LocalizedText) -> Self {
        Self {
            variant: variant.into(),
            value,
        }
    }

    /// Same axis and a locale-aware equal value.
    pub fn matches(&self, other: &SelectedVariant) -> bool {
        self.variant == other.variant && self.value.matches(&other.value)
    }

    /// Display label such as "color: Red".
    pub fn label(&self, locale: &str) -> String {
        format!("{}: {}", self.variant, self.value.display(locale))
    }
}

/// Order-independent set equality of two variant selections.
pub fn variants_equal(a: &[SelectedVariant], b: &[SelectedVariant]) -> bool {
    variants_contain(a, b) && variants_contain(b, a)
}

/// Every variant in `filter` appears in `row` with an equal value.
pub fn variants_contain(row: &[SelectedVariant], filter: &[SelectedVariant]) -> bool {
    filter
        .iter()
        .all(|wanted| row.iter().any(|have| have.matches(wanted)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(en: &str, ar: &str) -> SelectedVariant {
        SelectedVariant::new("color", LocalizedText::new("en", en).with("ar", ar))
    }

    #[test]
    fn test_matches_ignores_case_and_whitespace() {
        let a = LocalizedText::new("en", "Red ").with("ar", "أحمر");
        let b = LocalizedText::new("en", "  red").with("ar", " أحمر ");
        assert!(a.matches(&b));
    }

    #[test]
    fn test_matches_requires_every_locale() {
        let a = LocalizedText::new("en", "Red").with("ar", "أحمر");
        let b = LocalizedText::new("en", "Red");
        assert!(!a.matches(&b));
        assert!(!b.matches(&a));
    }

    #[test]
    fn test_plain_string_reads_as_default_locale() {
        let text: LocalizedText = serde_json::from_str("\"Mug\"").unwrap();
        assert_eq!(text.get(DEFAULT_LOCALE), Some("Mug"));

        let text: LocalizedText = serde_json::from_str(r#"{"en":"Mug","ar":"كوب"}"#).unwrap();
        assert_eq!(text.display("ar"), "كوب");
        assert_eq!(text.display("fr"), "Mug");
    }

    #[test]
    fn test_variants_equal_is_order_independent() {
        let size = SelectedVariant::new("size", LocalizedText::new("en", "M"));
        let a = vec![color("Red", "أحمر"), size.clone()];
        let b = vec![size, color("red", "أحمر")];
        assert!(variants_equal(&a, &b));
    }

    #[test]
    fn test_contain_is_subset_not_equality() {
        let size = SelectedVariant::new("size", LocalizedText::new("en", "M"));
        let row = vec![color("Red", "أحمر"), size];
        let filter = vec![color("Red", "أحمر")];

        assert!(variants_contain(&row, &filter));
        assert!(!variants_equal(&row, &filter));
        assert!(variants_contain(&row, &[]));
    }
}
