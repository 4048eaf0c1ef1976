//! Pre-mutation snapshots and undo.

use crate::domain::{BatchReport, Metadata, MutationOutcome, OperationKind, vault_path};
use crate::engine::executors::{ExecError, relocation_target};
use crate::engine::Mutation;
use crate::store::{FolderContents, NoteStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ulid::Ulid;

/// A note's content at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteState {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// What one successful item looked like before it was mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    /// A note that existed at `path`; `current` is where it lives now.
    Note {
        path: String,
        current: String,
        state: NoteState,
    },
    /// Nothing existed at `path`.
    Absent { path: String },
    /// A deleted folder and everything it held, byte for byte.
    Folder {
        path: String,
        contents: FolderContents,
    },
    FolderCreated { path: String },
    FolderMoved { from: String, to: String },
}

impl Snapshot {
    /// The path the snapshot restores.
    pub fn path(&self) -> &str {
        match self {
            Snapshot::Note { path, .. }
            | Snapshot::Absent { path }
            | Snapshot::Folder { path, .. }
            | Snapshot::FolderCreated { path } => path,
            Snapshot::FolderMoved { from, .. } => from,
        }
    }

    fn restore(&self, store: &mut impl NoteStore) -> Result<(), ExecError> {
        match self {
            Snapshot::Note {
                path,
                current,
                state,
            } => {
                if current != path && store.exists(current) {
                    store.move_note(current, path, true)?;
                }
                ensure_folder(store, vault_path::parent(path))?;
                store.write(path, &state.body, state.metadata.as_ref(), true)?;
            }
            Snapshot::Absent { path } => store.delete(path)?,
            Snapshot::Folder { path, contents } => {
                store.create_folder(path, true)?;
                for folder in &contents.folders {
                    store.create_folder(folder, true)?;
                }
                for file in &contents.files {
                    ensure_folder(store, vault_path::parent(&file.path))?;
                    store.write_raw(&file.path, &file.bytes, false)?;
                }
            }
            Snapshot::FolderCreated { path } => store.delete_folder(path, false)?,
            Snapshot::FolderMoved { from, to } => store.move_folder(to, from)?,
        }
        Ok(())
    }
}

fn ensure_folder(store: &mut impl NoteStore, folder: &str) -> Result<(), ExecError> {
    if !folder.is_empty() && !store.folder_exists(folder) {
        store.create_folder(folder, true)?;
    }
    Ok(())
}

fn note_state(store: &impl NoteStore, path: &str) -> Option<(String, NoteState)> {
    let note = store.read(path).ok()?;
    let path = note.path().to_string();
    let (body, metadata) = note.into_parts();
    Some((path, NoteState { body, metadata }))
}

/// Captures what undoing `mutation` on `target` would need.
///
/// Called before the mutation runs. Returns `Ok(None)` when the target
/// cannot be read (the mutation will then fail too) or when the mutation
/// would not change anything worth reverting.
///
/// # Errors
///
/// Returns an error when a folder about to be deleted cannot be read in
/// full. The caller must not delete it, since undo could not bring it back.
pub fn capture(
    store: &impl NoteStore,
    target: &str,
    mutation: &Mutation,
) -> Result<Option<Snapshot>, ExecError> {
    let target = vault_path::normalize(target);
    let snapshot = match mutation {
        Mutation::MergeTags { .. }
        | Mutation::OverwriteMetadata { .. }
        | Mutation::Update { .. }
        | Mutation::Append { .. }
        | Mutation::DeleteNote => note_state(store, &target).map(|(path, state)| Snapshot::Note {
            current: path.clone(),
            path,
            state,
        }),
        Mutation::Relocate {
            destination_folder,
            ..
        } => note_state(store, &target).map(|(path, state)| Snapshot::Note {
            current: relocation_target(&path, destination_folder),
            path,
            state,
        }),
        Mutation::Create { .. } => match note_state(store, &target) {
            Some((path, state)) => Some(Snapshot::Note {
                current: path.clone(),
                path,
                state,
            }),
            None => Some(Snapshot::Absent { path: target }),
        },
        Mutation::DeleteFolder { .. } => {
            if !store.folder_exists(&target) {
                return Ok(None);
            }
            let contents = store.folder_contents(&target)?;
            Some(Snapshot::Folder {
                path: target,
                contents,
            })
        }
        Mutation::CreateFolder { .. } => {
            (!store.folder_exists(&target)).then_some(Snapshot::FolderCreated { path: target })
        }
        Mutation::MoveFolder { destination } => Some(Snapshot::FolderMoved {
            to: relocation_target(&target, destination),
            from: target,
        }),
    };
    Ok(snapshot)
}

/// Journal entry for one recorded batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationHistory {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub operation: OperationKind,
    /// Snapshots of succeeded items, in attempt order.
    pub snapshots: Vec<Snapshot>,
    pub affected_paths: Vec<String>,
    pub success: bool,
    #[serde(default)]
    pub undone: bool,
}

impl OperationHistory {
    pub fn new(operation: OperationKind) -> Self {
        Self {
            id: Ulid::new().to_string(),
            timestamp: Utc::now(),
            operation,
            snapshots: Vec::new(),
            affected_paths: Vec::new(),
            success: true,
            undone: false,
        }
    }

    /// True if there is something to revert.
    pub fn is_undoable(&self) -> bool {
        !self.undone && !self.snapshots.is_empty()
    }
}

/// Reverts a recorded batch, newest item first.
///
/// Each snapshot is restored independently; a failure is reported and the
/// rest still run.
pub fn undo(store: &mut impl NoteStore, history: &OperationHistory) -> BatchReport {
    undo_pending(store, history).0
}

/// Like [`undo`], also returning the snapshots that failed to restore.
///
/// The returned snapshots keep their attempt order, so they can be
/// journaled again and retried once the cause is fixed.
pub fn undo_pending(
    store: &mut impl NoteStore,
    history: &OperationHistory,
) -> (BatchReport, Vec<Snapshot>) {
    info!(id = %history.id, operation = %history.operation, "undoing batch");

    let mut outcomes = Vec::with_capacity(history.snapshots.len());
    let mut pending = Vec::new();
    for snapshot in history.snapshots.iter().rev() {
        match snapshot.restore(store) {
            Ok(()) => outcomes.push(MutationOutcome::succeeded(snapshot.path(), snapshot.path())),
            Err(err) => {
                warn!(path = %snapshot.path(), error = %err, "undo failed");
                outcomes.push(MutationOutcome::failed(
                    snapshot.path(),
                    err.kind(),
                    err.to_string(),
                ));
                pending.push(snapshot.clone());
            }
        }
    }
    pending.reverse();

    (BatchReport::from_outcomes(OperationKind::Undo, outcomes), pending)
}
