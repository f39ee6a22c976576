//! Record types - one extracted item and its named field values.

use serde::{Deserialize, Serialize};

/// Prefix that marks a field value as a (possibly volatile) URL.
const URL_PREFIX: &str = "http";

/// A named value extracted for one configured field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this field holds a URL that may differ between renders of the
    /// same item (tracking params, session tokens, cache busters).
    pub fn is_volatile_url(&self) -> bool {
        self.value.len() > URL_PREFIX.len() && self.value.starts_with(URL_PREFIX)
    }

    /// Whether this field is present in `fields`.
    ///
    /// Volatile URLs are always present; anything else needs an exact
    /// (name, value) pair somewhere in the list. Position is irrelevant.
    pub fn is_present_in(&self, fields: &[Field]) -> bool {
        self.is_volatile_url() || fields.iter().any(|f| f == self)
    }
}

/// One extracted logical item.
///
/// `PartialEq` is structural. Deduplication uses [`Record::matches`], which
/// ignores volatile URL fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Item title, never empty for a record that reaches the store
    pub title: String,

    /// Name of the source that produced the record
    pub source: String,

    /// One entry per configured field, in configuration order
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field (builder pattern).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    /// Records with an empty title must never be stored or reported.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty()
    }

    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Dedup equality: same title, and every field of `self` is present in
    /// `other`'s fields (see [`Field::is_present_in`]).
    ///
    /// Directional; both sides normally share one schema so in practice it
    /// behaves symmetrically.
    pub fn matches(&self, other: &Record) -> bool {
        self.title == other.title
            && self.fields.iter().all(|f| f.is_present_in(&other.fields))
    }

    /// Whether any record in `known` matches this one.
    pub fn is_known_in(&self, known: &[Record]) -> bool {
        known.iter().any(|k| self.matches(k))
    }
}
