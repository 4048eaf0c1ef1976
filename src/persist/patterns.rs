//! Pattern library: named, reusable selection criteria.

use super::{Database, PersistError, format_time, parse_time};
use crate::domain::SelectionCriteria;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A saved selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPattern {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub criteria: SelectionCriteria,
    #[serde(default)]
    pub usage_count: u64,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl SearchPattern {
    pub fn new(name: impl Into<String>, criteria: SelectionCriteria) -> Self {
        Self {
            name: name.into(),
            description: None,
            criteria,
            usage_count: 0,
            created: Utc::now(),
            last_used: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Errors from a pattern store.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern not found: {name}")]
    NotFound { name: String },

    #[error("invalid pattern name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl From<rusqlite::Error> for PatternError {
    fn from(err: rusqlite::Error) -> Self {
        PatternError::Persist(err.into())
    }
}

impl From<serde_json::Error> for PatternError {
    fn from(err: serde_json::Error) -> Self {
        PatternError::Persist(err.into())
    }
}

fn check_name(name: &str) -> Result<(), PatternError> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(PatternError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Storage for named patterns.
///
/// Saving under an existing name replaces the pattern.
pub trait PatternStore {
    fn save(&mut self, pattern: SearchPattern) -> Result<(), PatternError>;

    fn load(&self, name: &str) -> Result<SearchPattern, PatternError>;

    /// Pattern names in sorted order.
    fn list(&self) -> Result<Vec<String>, PatternError>;

    fn remove(&mut self, name: &str) -> Result<(), PatternError>;

    /// Bumps the usage counter and last-used time.
    fn mark_used(&mut self, name: &str) -> Result<(), PatternError>;
}

/// Pattern store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatterns {
    patterns: BTreeMap<String, SearchPattern>,
}

impl MemoryPatterns {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternStore for MemoryPatterns {
    fn save(&mut self, pattern: SearchPattern) -> Result<(), PatternError> {
        check_name(&pattern.name)?;
        self.patterns.insert(pattern.name.clone(), pattern);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<SearchPattern, PatternError> {
        self.patterns
            .get(name)
            .cloned()
            .ok_or_else(|| PatternError::NotFound { name: name.into() })
    }

    fn list(&self) -> Result<Vec<String>, PatternError> {
        Ok(self.patterns.keys().cloned().collect())
    }

    fn remove(&mut self, name: &str) -> Result<(), PatternError> {
        self.patterns
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PatternError::NotFound { name: name.into() })
    }

    fn mark_used(&mut self, name: &str) -> Result<(), PatternError> {
        let pattern = self
            .patterns
            .get_mut(name)
            .ok_or_else(|| PatternError::NotFound { name: name.into() })?;
        pattern.usage_count += 1;
        pattern.last_used = Some(Utc::now());
        Ok(())
    }
}

impl PatternStore for Database {
    fn save(&mut self, pattern: SearchPattern) -> Result<(), PatternError> {
        check_name(&pattern.name)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO patterns (name, description, criteria, usage_count, created, last_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                pattern.name,
                pattern.description,
                serde_json::to_string(&pattern.criteria)?,
                pattern.usage_count as i64,
                format_time(&pattern.created),
                pattern.last_used.as_ref().map(format_time),
            ],
        )?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<SearchPattern, PatternError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, description, criteria, usage_count, created, last_used
                 FROM patterns WHERE name = ?1",
                [name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let (name, description, criteria, usage_count, created, last_used) =
            row.ok_or_else(|| PatternError::NotFound { name: name.into() })?;

        Ok(SearchPattern {
            name,
            description,
            criteria: serde_json::from_str(&criteria)?,
            usage_count: usage_count.max(0) as u64,
            created: parse_time("pattern timestamp", created)?,
            last_used: last_used
                .map(|t| parse_time("pattern timestamp", t))
                .transpose()?,
        })
    }

    fn list(&self) -> Result<Vec<String>, PatternError> {
        let mut stmt = self.conn.prepare("SELECT name FROM patterns ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn remove(&mut self, name: &str) -> Result<(), PatternError> {
        let changed = self
            .conn
            .execute("DELETE FROM patterns WHERE name = ?1", [name])?;
        if changed == 0 {
            return Err(PatternError::NotFound { name: name.into() });
        }
        Ok(())
    }

    fn mark_used(&mut self, name: &str) -> Result<(), PatternError> {
        let changed = self.conn.execute(
            "UPDATE patterns SET usage_count = usage_count + 1, last_used = ?2 WHERE name = ?1",
            params![name, format_time(&Utc::now())],
        )?;
        if changed == 0 {
            return Err(PatternError::NotFound { name: name.into() });
        }
        Ok(())
    }
}
