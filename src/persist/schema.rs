//! SQLite schema for the state database.

use rusqlite::Connection;

/// Creates the state schema. Idempotent.
///
/// # Tables Created
/// - `operations` - Undo journal, one row per recorded batch
/// - `patterns` - Named selection criteria
/// - `schema_version` - Schema version tracking
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    // Payload columns hold JSON.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS operations (
            id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            operation TEXT NOT NULL,
            success INTEGER NOT NULL,
            undone INTEGER NOT NULL DEFAULT 0,
            affected_paths TEXT NOT NULL,
            snapshots TEXT NOT NULL
        );",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS patterns (
            name TEXT PRIMARY KEY,
            description TEXT,
            criteria TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL,
            last_used TEXT
        );",
    )?;

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_operations_timestamp ON operations(timestamp);",
    )?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
        [],
    )?;

    Ok(())
}

/// Returns the current schema version.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get(0)
    })
}
