//! SQLite-backed engine state: undo journal and pattern library.

mod journal;
mod patterns;
mod schema;

pub use patterns::{MemoryPatterns, PatternError, PatternStore, SearchPattern};
pub use schema::{create_schema, get_schema_version};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory inside the vault holding engine state. Hidden, so never listed.
pub const STATE_DIR: &str = ".sheaf";

/// Database file name inside [`STATE_DIR`].
pub const DB_FILE: &str = "sheaf.db";

/// Returns the state database path for a vault.
pub fn state_path(vault_root: &Path) -> PathBuf {
    vault_root.join(STATE_DIR).join(DB_FILE)
}

/// Errors from the state database.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode journal payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("operation not found: {id}")]
    OperationNotFound { id: String },

    #[error("corrupt {what} in state database: {value}")]
    Corrupt { what: &'static str, value: String },
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Connection to the state database.
pub struct Database {
    conn: Connection,
}

impl Database {
    // ===========================================
    // In-Memory Connection
    // ===========================================

    /// Opens an in-memory database, for tests.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===========================================
    // File-Based Connection
    // ===========================================

    /// Opens or creates a database at `path`, creating parent directories.
    pub fn open(path: &Path) -> PersistResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| PersistError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens the state database of the vault at `vault_root`.
    pub fn open_for_vault(vault_root: &Path) -> PersistResult<Self> {
        Self::open(&state_path(vault_root))
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Fixed-width so stored timestamps sort lexically.
fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(what: &'static str, value: String) -> PersistResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| PersistError::Corrupt { what, value })
}
