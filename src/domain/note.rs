//! A note loaded from the store.

use crate::domain::Metadata;
use crate::domain::vault_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One addressable note: its vault-relative path, free-text body and
/// optional header fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    path: String,
    body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

impl Note {
    pub fn new(path: impl Into<String>, body: impl Into<String>, metadata: Option<Metadata>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            metadata,
        }
    }

    /// Returns the path relative to the store root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the header fields, or `None` if the note has no header.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Consumes the note, returning its body and header.
    pub fn into_parts(self) -> (String, Option<Metadata>) {
        (self.body, self.metadata)
    }

    /// Returns the note's tags (empty when there is no header).
    pub fn tags(&self) -> Vec<&str> {
        self.metadata.as_ref().map(Metadata::tags).unwrap_or_default()
    }

    /// Returns the parsed creation timestamp, if any.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.metadata.as_ref().and_then(Metadata::created)
    }

    /// Returns the header title, falling back to the file stem.
    pub fn title(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(Metadata::title)
            .unwrap_or_else(|| vault_path::file_stem(&self.path))
    }

    /// Returns the first `max_chars` characters of the body.
    pub fn excerpt(&self, max_chars: usize) -> String {
        self.body.trim().chars().take(max_chars).collect()
    }
}
