use appscout_scanner::Storefront;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sentinel written for fields the extractor could not resolve.
pub const UNKNOWN: &str = "N/A";

/// Column order of every record file.
pub const COLUMNS: [&str; 9] = [
    "Niche",
    "App Name",
    "Logo URL",
    "Install Count",
    "Release Date",
    "Rating",
    "Review Count",
    "App Link",
    "Developer",
];

/// A single record field: either a value or unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field {
    Known(String),
    #[default]
    Unknown,
}

impl Field {
    /// Trimmed value; empty strings and the sentinel become `Unknown`.
    pub fn new(value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if value.is_empty() || value == UNKNOWN {
            Field::Unknown
        } else {
            Field::Known(value.to_string())
        }
    }

    pub fn from_option<S: AsRef<str>>(value: Option<S>) -> Self {
        value.map(Field::new).unwrap_or_default()
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Field::Known(v) => Some(v),
            Field::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(UNKNOWN)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Field::Unknown)
    }

    /// Keep this value, or try the next source when unknown.
    pub fn or_else(self, next: impl FnOnce() -> Field) -> Field {
        match self {
            Field::Unknown => next(),
            known => known,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::new(value)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Field::new(raw))
    }
}

/// One listing, in file column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "Niche")]
    pub niche: Field,
    #[serde(rename = "App Name")]
    pub app_name: Field,
    #[serde(rename = "Logo URL")]
    pub logo_url: Field,
    #[serde(rename = "Install Count")]
    pub install_count: Field,
    #[serde(rename = "Release Date")]
    pub release_date: Field,
    #[serde(rename = "Rating")]
    pub rating: Field,
    #[serde(rename = "Review Count")]
    pub review_count: Field,
    #[serde(rename = "App Link")]
    pub app_link: Field,
    #[serde(rename = "Developer")]
    pub developer: Field,
}

impl Record {
    /// Deduplication key of this record.
    ///
    /// Listing links of a known storefront reduce to their identity key, so
    /// decorated links collapse; any other non-empty link is its own key.
    pub fn identity_key(&self) -> Option<String> {
        let link = self.app_link.value()?;
        match Storefront::detect(link) {
            Some((_, key)) => Some(key),
            None => Some(link.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sentinel_round_trip() {
        assert_eq!(Field::new("  N/A "), Field::Unknown);
        assert_eq!(Field::new(""), Field::Unknown);
        assert_eq!(Field::new(" 4.5 ").as_str(), "4.5");
        assert_eq!(Field::Unknown.to_string(), UNKNOWN);
    }

    #[test]
    fn test_field_fallback_chain() {
        let resolved = Field::Unknown
            .or_else(|| Field::Unknown)
            .or_else(|| Field::new("Second"))
            .or_else(|| Field::new("Third"));
        assert_eq!(resolved.as_str(), "Second");
    }

    #[test]
    fn test_identity_key_collapses_decoration() {
        let a = Record {
            app_link: Field::new("https://play.google.com/store/apps/details?id=com.x.y"),
            ..Record::default()
        };
        let b = Record {
            app_link: Field::new("http://play.google.com/store/apps/details?id=com.x.y&hl=de"),
            ..Record::default()
        };
        assert_eq!(a.identity_key(), Some("com.x.y".to_string()));
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_identity_key_of_unknown_link() {
        assert_eq!(Record::default().identity_key(), None);
        let other = Record {
            app_link: Field::new("https://example.com/app/1"),
            ..Record::default()
        };
        assert_eq!(other.identity_key().as_deref(), Some("https://example.com/app/1"));
    }
}
