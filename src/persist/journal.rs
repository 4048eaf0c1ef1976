//! Undo journal storage.

use super::{Database, PersistError, PersistResult, format_time, parse_time};
use crate::domain::OperationKind;
use crate::engine::{OperationHistory, Snapshot};
use rusqlite::{OptionalExtension, Row, params};

const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, operation, success, undone, affected_paths, snapshots FROM operations";

/// Raw column values, decoded outside the row callback.
struct OperationRow {
    id: String,
    timestamp: String,
    operation: String,
    success: bool,
    undone: bool,
    affected_paths: String,
    snapshots: String,
}

impl OperationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            operation: row.get(2)?,
            success: row.get(3)?,
            undone: row.get(4)?,
            affected_paths: row.get(5)?,
            snapshots: row.get(6)?,
        })
    }

    fn decode(self) -> PersistResult<OperationHistory> {
        let operation: OperationKind =
            self.operation
                .parse()
                .map_err(|_| PersistError::Corrupt {
                    what: "operation kind",
                    value: self.operation.clone(),
                })?;
        Ok(OperationHistory {
            id: self.id,
            timestamp: parse_time("timestamp", self.timestamp)?,
            operation,
            snapshots: serde_json::from_str(&self.snapshots)?,
            affected_paths: serde_json::from_str(&self.affected_paths)?,
            success: self.success,
            undone: self.undone,
        })
    }
}

impl Database {
    /// Stores a journal entry.
    pub fn record(&self, history: &OperationHistory) -> PersistResult<()> {
        self.conn.execute(
            "INSERT INTO operations (id, timestamp, operation, success, undone, affected_paths, snapshots)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                history.id,
                format_time(&history.timestamp),
                history.operation.as_str(),
                history.success,
                history.undone,
                serde_json::to_string(&history.affected_paths)?,
                serde_json::to_string(&history.snapshots)?,
            ],
        )?;
        Ok(())
    }

    /// Loads a journal entry by id.
    pub fn load_operation(&self, id: &str) -> PersistResult<OperationHistory> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                OperationRow::from_row,
            )
            .optional()?;
        row.ok_or_else(|| PersistError::OperationNotFound { id: id.to_string() })?
            .decode()
    }

    /// Returns the newest entry that can still be undone.
    pub fn latest_undoable(&self) -> PersistResult<Option<OperationHistory>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "{} WHERE undone = 0 AND snapshots != '[]' ORDER BY timestamp DESC, id DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                [],
                OperationRow::from_row,
            )
            .optional()?;
        row.map(OperationRow::decode).transpose()
    }

    /// Lists entries, newest first.
    pub fn list_operations(&self, limit: usize) -> PersistResult<Vec<OperationHistory>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} ORDER BY timestamp DESC, id DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map([limit as i64], OperationRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(OperationRow::decode).collect()
    }

    /// Flags an entry as undone so it is not replayed twice.
    /// Replaces an entry's snapshots with the ones still waiting to be undone.
    pub fn retain_snapshots(&self, id: &str, pending: &[Snapshot]) -> PersistResult<()> {
        let changed = self.conn.execute(
            "UPDATE operations SET snapshots = ?2 WHERE id = ?1",
            params![id, serde_json::to_string(pending)?],
        )?;
        if changed == 0 {
            return Err(PersistError::OperationNotFound { id: id.to_string() });
        }
        Ok(())
    }

    pub fn mark_undone(&self, id: &str) -> PersistResult<()> {
        let changed = self
            .conn
            .execute("UPDATE operations SET undone = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(PersistError::OperationNotFound { id: id.to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NoteState;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn entry(kind: OperationKind, minutes_ago: i64) -> OperationHistory {
        let mut history = OperationHistory::new(kind);
        history.timestamp = Utc::now() - Duration::minutes(minutes_ago);
        history.snapshots.push(Snapshot::Note {
            path: "a.md".into(),
            current: "a.md".into(),
            state: NoteState {
                body: "before".into(),
                metadata: None,
            },
        });
        history.affected_paths.push("a.md".into());
        history
    }

    #[test]
    fn record_and_load_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let history = entry(OperationKind::TagMerge, 0);
        db.record(&history).unwrap();

        let loaded = db.load_operation(&history.id).unwrap();
        assert_eq!(loaded.snapshots, history.snapshots);
        assert_eq!(loaded.operation, OperationKind::TagMerge);
        assert_eq!(loaded.affected_paths, vec!["a.md"]);
    }

    #[test]
    fn load_unknown_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.load_operation("nope"),
            Err(PersistError::OperationNotFound { .. })
        ));
    }

    #[test]
    fn latest_undoable_skips_undone_and_empty() {
        let db = Database::open_in_memory().unwrap();
        let older = entry(OperationKind::TagMerge, 10);
        let newer = entry(OperationKind::Relocate, 5);
        let mut empty = entry(OperationKind::DeleteNote, 1);
        empty.snapshots.clear();
        db.record(&older).unwrap();
        db.record(&newer).unwrap();
        db.record(&empty).unwrap();

        assert_eq!(db.latest_undoable().unwrap().unwrap().id, newer.id);
        db.mark_undone(&newer.id).unwrap();
        assert_eq!(db.latest_undoable().unwrap().unwrap().id, older.id);
        db.mark_undone(&older.id).unwrap();
        assert!(db.latest_undoable().unwrap().is_none());
    }

    #[test]
    fn list_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let older = entry(OperationKind::TagMerge, 10);
        let newer = entry(OperationKind::Relocate, 5);
        db.record(&older).unwrap();
        db.record(&newer).unwrap();

        let ids: Vec<String> = db
            .list_operations(10)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn retain_snapshots_keeps_entry_undoable() {
        let db = Database::open_in_memory().unwrap();
        let mut history = entry(OperationKind::DeleteNote, 1);
        history.snapshots.push(Snapshot::Absent {
            path: "later.md".into(),
        });
        db.record(&history).unwrap();

        let pending = vec![history.snapshots[1].clone()];
        db.retain_snapshots(&history.id, &pending).unwrap();

        let loaded = db.latest_undoable().unwrap().unwrap();
        assert_eq!(loaded.id, history.id);
        assert_eq!(loaded.snapshots, pending);
        assert!(db.retain_snapshots("missing", &pending).is_err());
    }

    #[test]
    fn mark_undone_unknown_is_error() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.mark_undone("missing").is_err());
    }
}
