// Extracted Listing - schema-less field bag

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known listing keys
///
/// Not exhaustive: every label found on a page becomes a key.
pub mod keys {
    pub const RENT_PER_MONTH: &str = "miete_/_monat";
    pub const ADDRESS: &str = "adresse";
    pub const LOCALITY: &str = "ort";
    pub const REGION: &str = "region";
    pub const DISTRICT: &str = "kreis_quartier";
    pub const DESCRIPTION: &str = "description";
    pub const SEEKING: &str = "seeking";
    pub const WE_ARE: &str = "we_are";
}

/// Flat mapping from normalized field name to value
///
/// A missing key means the field was not on the page. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedListing(BTreeMap<String, Option<String>>);

impl ExtractedListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Some(value.into()));
    }

    /// Record a field that exists but carries no value
    pub fn insert_absent(&mut self, key: impl Into<String>) {
        self.0.insert(key.into(), None);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Street address, if present and non-blank
    pub fn address(&self) -> Option<&str> {
        self.non_blank(keys::ADDRESS)
    }

    /// Locality hint (postal code + city), if present and non-blank
    pub fn locality(&self) -> Option<&str> {
        self.non_blank(keys::LOCALITY)
    }

    fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Serialize for the `content` column
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl<K, V> FromIterator<(K, V)> for ExtractedListing
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}
