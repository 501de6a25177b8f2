use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Locale tried after the requested one.
pub const PRIMARY_LOCALE: &str = "pt";
/// Locale tried after [`PRIMARY_LOCALE`].
pub const SECONDARY_LOCALE: &str = "en";

/// A text field that is either a single string or a per-locale mapping.
///
/// Stored remotely as a JSON string or a JSON object keyed by locale code.
/// The key order of the object is preserved, since resolution falls back to
/// the first key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizedText {
    Plain(String),
    ByLocale(Vec<(String, String)>),
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

impl From<&str> for LocalizedText {
    fn from(s: &str) -> Self {
        LocalizedText::Plain(s.to_string())
    }
}

impl From<String> for LocalizedText {
    fn from(s: String) -> Self {
        LocalizedText::Plain(s)
    }
}

impl LocalizedText {
    /// Build a mapping from `(locale, text)` pairs, keeping their order.
    pub fn by_locale<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        LocalizedText::ByLocale(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolve the display string for `locale`.
    pub fn get(&self, locale: &str) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::ByLocale(entries) => {
                let lookup = |key: &str| {
                    entries
                        .iter()
                        .find(|(k, v)| k == key && !v.is_empty())
                        .map(|(_, v)| v.as_str())
                };

                lookup(locale)
                    .or_else(|| lookup(PRIMARY_LOCALE))
                    .or_else(|| lookup(SECONDARY_LOCALE))
                    .or_else(|| entries.first().map(|(_, v)| v.as_str()))
                    .unwrap_or("")
            }
        }
    }
}

/// Resolve an optional localized value, returning `""` when absent.
pub fn localized<'a>(content: Option<&'a LocalizedText>, locale: &str) -> &'a str {
    content.map_or("", |text| text.get(locale))
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LocalizedText::Plain(text) => serializer.serialize_str(text),
            LocalizedText::ByLocale(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (locale, text) in entries {
                    map.serialize_entry(locale, text)?;
                }
                map.end()
            }
        }
    }
}

struct LocalizedTextVisitor;

impl<'de> Visitor<'de> for LocalizedTextVisitor {
    type Value = LocalizedText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a map of locale codes to strings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(LocalizedText::Plain(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(LocalizedText::Plain(v))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(2));
        while let Some((locale, text)) = access.next_entry::<String, Option<String>>()? {
            if let Some(text) = text {
                entries.push((locale, text));
            }
        }
        Ok(LocalizedText::ByLocale(entries))
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LocalizedTextVisitor)
    }
}
