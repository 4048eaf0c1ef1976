//! Declarative selection criteria for bulk operations.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::metadata::parse_timestamp;
use crate::domain::vault_path;

/// Errors raised when criteria cannot be compiled.
#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid {field} '{value}': expected YYYY-MM-DD, RFC 3339 or Nd")]
    InvalidDate { field: &'static str, value: String },

    #[error("created_after ({after}) is later than created_before ({before})")]
    InvertedRange { after: String, before: String },

    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// Which end of a date range a bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

/// Parses a date bound.
///
/// Accepts:
/// - Relative: "7d", "30d" (days ago from now)
/// - Absolute date: "2024-01-15" (start of day for a lower bound, end of day
///   for an upper bound)
/// - Timestamps: RFC 3339 or `YYYY-MM-DDTHH:MM:SS` (UTC)
pub fn parse_date_bound(s: &str, side: BoundSide) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Some(days_str) = s.strip_suffix('d') {
        let days: i64 = days_str.parse().ok()?;
        if days < 0 {
            return None;
        }
        return Some(Utc::now() - Duration::days(days));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = match side {
            BoundSide::Lower => date.and_hms_opt(0, 0, 0)?,
            BoundSide::Upper => date.and_hms_nano_opt(23, 59, 59, 999_999_999)?,
        };
        return Some(naive.and_utc());
    }

    parse_timestamp(s)
}

/// Selection predicate over note attributes.
///
/// Every present field must hold (logical AND). Within `tags` a single
/// shared tag is enough (logical OR). Empty strings and empty tag lists
/// are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionCriteria {
    /// Match notes carrying any of these tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Match notes whose body contains this text (case-sensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_contains: Option<String>,

    /// Glob over the relative path (`*`, `?`, `[...]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_pattern: Option<String>,

    /// Inclusive lower bound on the `created` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,

    /// Inclusive upper bound on the `created` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,

    /// `true` matches tagged notes, `false` matches untagged notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_tag: Option<bool>,

    /// Match notes inside this folder (any depth).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,

    /// Stop after this many matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SelectionCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_content(mut self, text: impl Into<String>) -> Self {
        self.content_contains = Some(text.into());
        self
    }

    pub fn with_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.path_pattern = Some(pattern.into());
        self
    }

    pub fn with_created_after(mut self, bound: impl Into<String>) -> Self {
        self.created_after = Some(bound.into());
        self
    }

    pub fn with_created_before(mut self, bound: impl Into<String>) -> Self {
        self.created_before = Some(bound.into());
        self
    }

    pub fn with_has_tag(mut self, has_tag: bool) -> Self {
        self.has_tag = Some(has_tag);
        self
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder_path = Some(folder.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if no field constrains the selection.
    pub fn is_unconstrained(&self) -> bool {
        non_empty_tags(self.tags.as_ref()).is_none()
            && non_empty(self.content_contains.as_deref()).is_none()
            && non_empty(self.path_pattern.as_deref()).is_none()
            && non_empty(self.created_after.as_deref()).is_none()
            && non_empty(self.created_before.as_deref()).is_none()
            && self.has_tag.is_none()
            && non_empty(self.folder_path.as_deref()).is_none()
    }

    /// Validates the criteria and prepares them for matching.
    ///
    /// # Errors
    ///
    /// Returns `CriteriaError` for an invalid glob, an unparseable date,
    /// an inverted date range or a zero limit.
    pub fn compile(&self) -> Result<CompiledCriteria, CriteriaError> {
        if self.limit == Some(0) {
            return Err(CriteriaError::ZeroLimit);
        }

        let glob = match non_empty(self.path_pattern.as_deref()) {
            Some(pattern) => Some(
                GlobBuilder::new(pattern)
                    .literal_separator(false)
                    .build()
                    .map_err(|source| CriteriaError::InvalidGlob {
                        pattern: pattern.to_string(),
                        source,
                    })?
                    .compile_matcher(),
            ),
            None => None,
        };

        let created_after = compile_bound("created_after", &self.created_after, BoundSide::Lower)?;
        let created_before =
            compile_bound("created_before", &self.created_before, BoundSide::Upper)?;

        if let (Some(after), Some(before)) = (created_after, created_before)
            && after > before
        {
            return Err(CriteriaError::InvertedRange {
                after: self.created_after.clone().unwrap_or_default(),
                before: self.created_before.clone().unwrap_or_default(),
            });
        }

        Ok(CompiledCriteria {
            tags: non_empty_tags(self.tags.as_ref()).cloned(),
            content_contains: non_empty(self.content_contains.as_deref()).map(str::to_string),
            glob,
            created_after,
            created_before,
            has_tag: self.has_tag,
            folder_path: non_empty(self.folder_path.as_deref()).map(vault_path::normalize),
            limit: self.limit,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty_tags(tags: Option<&Vec<String>>) -> Option<&Vec<String>> {
    tags.filter(|t| !t.is_empty())
}

fn compile_bound(
    field: &'static str,
    value: &Option<String>,
    side: BoundSide,
) -> Result<Option<DateTime<Utc>>, CriteriaError> {
    match non_empty(value.as_deref()) {
        None => Ok(None),
        Some(raw) => parse_date_bound(raw, side)
            .map(Some)
            .ok_or_else(|| CriteriaError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
    }
}

/// Criteria with every field parsed and validated.
///
/// Produced by [`SelectionCriteria::compile`]; consumed by the matcher.
#[derive(Debug, Clone)]
pub struct CompiledCriteria {
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) content_contains: Option<String>,
    pub(crate) glob: Option<GlobMatcher>,
    pub(crate) created_after: Option<DateTime<Utc>>,
    pub(crate) created_before: Option<DateTime<Utc>>,
    pub(crate) has_tag: Option<bool>,
    pub(crate) folder_path: Option<String>,
    pub(crate) limit: Option<usize>,
}

impl CompiledCriteria {
    /// Returns the result cap, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}
