//! Splits a markdown file into its YAML header and body, and joins them back.

use crate::domain::Metadata;
use thiserror::Error;

/// A markdown file split into header and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNote {
    /// `None` when the file has no header block at all.
    pub metadata: Option<Metadata>,
    pub body: String,
}

/// Errors during frontmatter parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing closing frontmatter delimiter '---'")]
    MissingClosingDelimiter,

    #[error("invalid YAML in frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("invalid frontmatter: {0}")]
    InvalidFrontmatter(String),
}

/// Parses markdown content with optional YAML frontmatter.
///
/// # Format
/// ```text
/// ---
/// title: Roadmap
/// tags: [project, active]
/// created: 2024-01-15
/// ---
/// Body content here...
/// ```
///
/// Content that does not start with a `---` line has no header; the whole
/// text becomes the body. An empty header block yields empty metadata.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - A header is opened but never closed
/// - The YAML between delimiters is invalid
/// - The header is not a mapping
pub fn parse(content: &str) -> Result<ParsedNote, ParseError> {
    let after_opening = if content.starts_with("---\r\n") {
        5
    } else if content.starts_with("---\n") {
        4
    } else if content == "---" {
        return Err(ParseError::MissingClosingDelimiter);
    } else {
        return Ok(ParsedNote {
            metadata: None,
            body: content.to_string(),
        });
    };

    let yaml_and_rest = &content[after_opening..];
    let closing_pos = find_closing_delimiter(yaml_and_rest)?;
    let yaml_content = &yaml_and_rest[..closing_pos];

    let after_closing = &yaml_and_rest[closing_pos..];
    let body = if let Some(rest) = after_closing.strip_prefix("---\r\n") {
        rest
    } else if let Some(rest) = after_closing.strip_prefix("---\n") {
        rest
    } else {
        ""
    };

    Ok(ParsedNote {
        metadata: Some(parse_header(yaml_content)?),
        body: body.to_string(),
    })
}

fn parse_header(yaml: &str) -> Result<Metadata, ParseError> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match value {
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        other => Err(ParseError::InvalidFrontmatter(format!(
            "expected a mapping, found {}",
            yaml_kind(&other)
        ))),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Serializes metadata and body back to markdown.
///
/// With `None` the body is written as-is, so a note without a header keeps
/// having none. Keys come out in sorted order.
///
/// # Errors
///
/// Returns `ParseError::InvalidYaml` if a value cannot be represented.
pub fn serialize(metadata: Option<&Metadata>, body: &str) -> Result<String, ParseError> {
    match metadata {
        None => Ok(body.to_string()),
        Some(metadata) if metadata.is_empty() => Ok(format!("---\n---\n{}", body)),
        Some(metadata) => {
            let yaml = serde_yaml::to_string(metadata)?;
            Ok(format!("---\n{}---\n{}", yaml, body))
        }
    }
}

/// Finds the byte offset of the closing `---` line.
///
/// The delimiter must start a line and be followed by a newline or EOF.
fn find_closing_delimiter(content: &str) -> Result<usize, ParseError> {
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" {
            return Ok(pos);
        }
        pos += line.len();
    }
    Err(ParseError::MissingClosingDelimiter)
}
