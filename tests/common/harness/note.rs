//! Builder for test notes with sensible defaults.

#![allow(dead_code)]

use sheaf::domain::{MetaValue, Metadata};
use sheaf::infra::serialize;

/// Builder for creating test notes with sensible defaults.
///
/// A note without any header field is written as plain body text.
#[derive(Debug, Clone)]
pub struct TestNote {
    path: String,
    metadata: Metadata,
    tags: Vec<String>,
    body: String,
}

impl TestNote {
    /// Creates a new test note at a vault-relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            metadata: Metadata::new(),
            tags: Vec::new(),
            body: String::new(),
        }
    }

    /// Sets the title field.
    pub fn title(self, title: &str) -> Self {
        self.field("title", title)
    }

    /// Adds a tag to the note.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the `created` field (e.g. `2024-01-01`).
    pub fn created(self, created: &str) -> Self {
        self.field("created", created)
    }

    /// Sets an arbitrary header field.
    pub fn field(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Sets the body content (builder method).
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the vault-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Renders the note file contents.
    pub fn to_content(&self) -> String {
        let mut metadata = self.metadata.clone();
        if !self.tags.is_empty() {
            metadata.set_tags(self.tags.iter().cloned());
        }
        let header = (!metadata.is_empty()).then_some(&metadata);
        serialize(header, &self.body).expect("Failed to serialize test note")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheaf::infra::parse;

    // ===========================================
    // Phase 2: TestNote Builder
    // ===========================================

    #[test]
    fn test_note_without_fields_is_plain_body() {
        let note = TestNote::new("plain.md").body("Just text\n");
        assert_eq!(note.to_content(), "Just text\n");
    }

    #[test]
    fn test_note_renders_parseable_header() {
        let note = TestNote::new("a.md")
            .title("Alpha")
            .tag("ml")
            .tag("research")
            .created("2024-03-01")
            .body("Body\n");

        let parsed = parse(&note.to_content()).expect("Should parse the note");
        let metadata = parsed.metadata.expect("header should be present");
        assert_eq!(metadata.title(), Some("Alpha"));
        assert_eq!(metadata.tags(), vec!["ml", "research"]);
        assert_eq!(parsed.body, "Body\n");
    }
}
