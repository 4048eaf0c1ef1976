//! Per-target mutation executors.
//!
//! Every executor turns store errors into a failed [`MutationOutcome`];
//! nothing here returns `Err` to the batch.

use crate::domain::{FailureKind, MutationOutcome, OperationKind, vault_path};
use crate::engine::{ExecOptions, Mutation};
use crate::store::{NoteStore, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single mutation failed.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("parent folder does not exist: {path}")]
    MissingParent { path: String },

    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("folder not empty (use recursive to delete its contents): {path}")]
    NotEmpty { path: String },

    #[error("{operation} requires confirm_destructive to prevent accidental data loss")]
    PermissionGate { operation: OperationKind },

    #[error("{0}")]
    Validation(String),

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("{0}")]
    Io(String),
}

impl ExecError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecError::NotFound { .. } | ExecError::MissingParent { .. } => FailureKind::NotFound,
            ExecError::AlreadyExists { .. } => FailureKind::AlreadyExists,
            ExecError::NotEmpty { .. } => FailureKind::NotEmpty,
            ExecError::PermissionGate { .. } => FailureKind::PermissionGate,
            ExecError::Validation(_) => FailureKind::Validation,
            ExecError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            ExecError::Io(_) => FailureKind::Io,
        }
    }
}

impl From<StoreError> for ExecError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { path } => ExecError::NotFound { path },
            StoreError::ParentNotFound { path } => ExecError::MissingParent { path },
            StoreError::AlreadyExists { path } => ExecError::AlreadyExists { path },
            StoreError::NotEmpty { path } => ExecError::NotEmpty { path },
            StoreError::PermissionDenied { path } => ExecError::PermissionDenied { path },
            StoreError::InvalidPath { .. } => ExecError::Validation(err.to_string()),
            StoreError::Parse { .. } | StoreError::InvalidEncoding { .. } | StoreError::Io { .. } => {
                ExecError::Io(err.to_string())
            }
        }
    }
}

/// Applies `mutation` to one target.
///
/// On success the outcome's identity is the target's path afterwards
/// (the destination for moves).
pub fn apply(
    store: &mut impl NoteStore,
    target: &str,
    mutation: &Mutation,
    options: ExecOptions,
) -> MutationOutcome {
    match execute(store, target, mutation, options) {
        Ok(identity) => {
            debug!(target = %target, identity = %identity, "applied {}", mutation.kind());
            MutationOutcome::succeeded(target, identity)
        }
        Err(err) => {
            warn!(path = %target, error = %err, "{} failed", mutation.kind());
            MutationOutcome::failed(target, err.kind(), err.to_string())
        }
    }
}

fn execute(
    store: &mut impl NoteStore,
    target: &str,
    mutation: &Mutation,
    options: ExecOptions,
) -> Result<String, ExecError> {
    let kind = mutation.kind();
    if kind.is_destructive() && !options.confirm_destructive {
        return Err(ExecError::PermissionGate { operation: kind });
    }
    mutation
        .validate()
        .map_err(|e| ExecError::Validation(e.to_string()))?;
    if let Some(reason) = vault_path::validate(target) {
        return Err(ExecError::Validation(format!("{}: {}", reason, target)));
    }

    match mutation {
        Mutation::MergeTags { tags, extra } => {
            let note = store.read(target)?;
            let path = note.path().to_string();
            let (body, metadata) = note.into_parts();
            let mut metadata = metadata.unwrap_or_default();
            metadata.merge_tags(tags.as_slice());
            metadata.overlay(extra, true);
            store.write(&path, &body, Some(&metadata), true)?;
            Ok(path)
        }
        Mutation::OverwriteMetadata { fields } => {
            let note = store.read(target)?;
            let path = note.path().to_string();
            let (body, metadata) = note.into_parts();
            let mut metadata = metadata.unwrap_or_default();
            metadata.overlay(fields, false);
            store.write(&path, &body, Some(&metadata), true)?;
            Ok(path)
        }
        Mutation::Relocate {
            destination_folder,
            create_folders,
        } => {
            let source = vault_path::normalize(target);
            if !store.exists(&source) {
                return Err(ExecError::NotFound { path: source });
            }
            let destination = relocation_target(&source, destination_folder);
            if destination != source {
                store.move_note(&source, &destination, *create_folders)?;
            }
            Ok(destination)
        }
        Mutation::Create {
            body,
            metadata,
            overwrite,
            create_folders,
        } => {
            let path = vault_path::normalize(target);
            let parent = vault_path::parent(&path);
            if *create_folders && !store.folder_exists(parent) {
                store.create_folder(parent, true)?;
            }
            store.write(&path, body, metadata.as_ref(), *overwrite)?;
            Ok(path)
        }
        Mutation::Update { body, metadata } => {
            let note = store.read(target)?;
            let path = note.path().to_string();
            let metadata = metadata.as_ref().or(note.metadata());
            store.write(&path, body, metadata, true)?;
            Ok(path)
        }
        Mutation::Append { text } => {
            let note = store.read(target)?;
            let path = note.path().to_string();
            let (mut body, metadata) = note.into_parts();
            if !body.is_empty() && !body.ends_with('\n') {
                body.push('\n');
            }
            body.push_str(text);
            store.write(&path, &body, metadata.as_ref(), true)?;
            Ok(path)
        }
        Mutation::DeleteNote => {
            let path = vault_path::normalize(target);
            store.delete(&path)?;
            Ok(path)
        }
        Mutation::DeleteFolder { recursive } => {
            let path = vault_path::normalize(target);
            store.delete_folder(&path, *recursive)?;
            Ok(path)
        }
        Mutation::CreateFolder { exist_ok } => {
            let path = vault_path::normalize(target);
            store.create_folder(&path, *exist_ok)?;
            Ok(path)
        }
        Mutation::MoveFolder { destination } => {
            let source = vault_path::normalize(target);
            if !store.folder_exists(&source) {
                return Err(ExecError::NotFound { path: source });
            }
            let moved = relocation_target(&source, destination);
            store.move_folder(&source, &moved)?;
            Ok(moved)
        }
    }
}

/// Path an item at `source` ends up at when moved into `folder`.
pub fn relocation_target(source: &str, folder: &str) -> String {
    vault_path::join(folder, vault_path::base_name(source))
}
