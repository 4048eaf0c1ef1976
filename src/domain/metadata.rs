//! Metadata bag for a note's structured header fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Key holding the note's tag list.
pub const TAGS_KEY: &str = "tags";

/// Key holding the note's creation timestamp.
pub const CREATED_KEY: &str = "created";

/// Key holding the note's title.
pub const TITLE_KEY: &str = "title";

/// A single header value: a scalar or a list of strings.
///
/// Anything else found in a header (nested mappings, mixed lists, null) is
/// kept verbatim in [`MetaValue::Other`] so a rewrite never drops it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
    Other(serde_yaml::Value),
}

impl MetaValue {
    /// Converts a raw YAML value into the closest `MetaValue`.
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetaValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    MetaValue::Float(f)
                } else {
                    MetaValue::Other(Value::Number(n))
                }
            }
            Value::String(s) => MetaValue::Text(s),
            Value::Sequence(items) => {
                let all_scalars = items.iter().all(|v| {
                    matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_))
                });
                if !all_scalars {
                    return MetaValue::Other(Value::Sequence(items));
                }
                MetaValue::List(items.into_iter().filter_map(scalar_to_string).collect())
            }
            other => MetaValue::Other(other),
        }
    }

    /// Returns the value as a string slice if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a list of strings.
    ///
    /// A single text value is treated as a one-element list.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            MetaValue::List(items) => items.iter().map(String::as_str).collect(),
            MetaValue::Text(s) if !s.is_empty() => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// Reads the value as tags.
    ///
    /// A scalar becomes a one-element list, so `tags: 2024` reads as
    /// `"2024"`, and null is empty. Values with no string form, such as
    /// mappings, are handed back unchanged.
    fn into_tags(self) -> Result<Vec<String>, MetaValue> {
        match self {
            MetaValue::List(items) => Ok(items),
            MetaValue::Text(s) => Ok(vec![s]),
            MetaValue::Bool(b) => Ok(vec![b.to_string()]),
            MetaValue::Int(i) => Ok(vec![i.to_string()]),
            MetaValue::Float(x) => Ok(vec![x.to_string()]),
            MetaValue::Other(serde_yaml::Value::Null) => Ok(Vec::new()),
            other => Err(other),
        }
    }
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for MetaValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        Ok(MetaValue::from_yaml(raw))
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::Float(x) => write!(f, "{}", x),
            MetaValue::Text(s) => write!(f, "{}", s),
            MetaValue::List(items) => write!(f, "[{}]", items.join(", ")),
            MetaValue::Other(v) => {
                let yaml = serde_yaml::to_string(v).map_err(|_| fmt::Error)?;
                write!(f, "{}", yaml.trim_end())
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(items: Vec<String>) -> Self {
        MetaValue::List(items)
    }
}

/// A note's header fields keyed by name.
///
/// The `tags` entry, when present, is a list of unique strings. A `tags`
/// value with no string form is kept verbatim and reads as no tags.
/// Deduplication is exact: `AI` and `ai` are distinct tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, MetaValue>",
    into = "BTreeMap<String, MetaValue>"
)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    /// Creates an empty metadata bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    /// Inserts a value, normalizing the `tags` entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        let key = key.into();
        let value = value.into();
        if key != TAGS_KEY {
            self.0.insert(key, value);
            return;
        }
        match value.into_tags() {
            Ok(tags) => self.set_tags(tags),
            Err(raw) => {
                self.0.insert(key, raw);
            }
        }
    }

    /// Removes a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the note's tags, in stored order.
    pub fn tags(&self) -> Vec<&str> {
        self.0
            .get(TAGS_KEY)
            .map(MetaValue::as_list)
            .unwrap_or_default()
    }

    /// Replaces the tag list, dropping exact duplicates.
    pub fn set_tags<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.0
            .insert(TAGS_KEY.to_string(), MetaValue::List(unique_tags(tags)));
    }

    /// Adds tags to the existing list as a set union.
    ///
    /// Existing tags keep their position; new tags are appended in input
    /// order. Merging the same tags twice is a no-op.
    pub fn merge_tags<S: AsRef<str>>(&mut self, new_tags: &[S]) {
        let existing: Vec<String> = self.tags().into_iter().map(str::to_string).collect();
        let incoming = new_tags.iter().map(|t| t.as_ref().to_string());
        self.set_tags(existing.into_iter().chain(incoming));
    }

    /// Applies every entry of `other` on top of this bag; `other` wins.
    ///
    /// When `skip_tags` is set the `tags` entry of `other` is ignored.
    pub fn overlay(&mut self, other: &Metadata, skip_tags: bool) {
        for (key, value) in other.iter() {
            if skip_tags && key == TAGS_KEY {
                continue;
            }
            self.insert(key, value.clone());
        }
    }

    /// Returns the title field, if set.
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY).and_then(MetaValue::as_str)
    }

    /// Parses the `created` field as a UTC timestamp.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and
    /// `YYYY-MM-DD` (midnight UTC). Returns `None` for anything else.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.get(CREATED_KEY)
            .and_then(MetaValue::as_str)
            .and_then(parse_timestamp)
    }
}

/// Parses a header timestamp in one of the accepted formats.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deduplicates tags exactly, keeping the first occurrence of each.
pub fn unique_tags<I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

impl From<BTreeMap<String, MetaValue>> for Metadata {
    fn from(map: BTreeMap<String, MetaValue>) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in map {
            metadata.insert(key, value);
        }
        metadata
    }
}

impl From<Metadata> for BTreeMap<String, MetaValue> {
    fn from(metadata: Metadata) -> Self {
        metadata.0
    }
}

impl<K: Into<String>, V: Into<MetaValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}
