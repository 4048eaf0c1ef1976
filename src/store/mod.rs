//! Note store: the single-item persistence layer the engine mutates.

mod fs;
mod memory;
#[cfg(test)]
pub(crate) mod testing;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::domain::{Metadata, Note, vault_path};
use crate::infra::ParseError;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Errors raised by a note store.
///
/// Paths are vault-relative.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    #[error("folder not empty: {path}")]
    NotEmpty { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("parent folder does not exist: {path}")]
    ParentNotFound { path: String },

    #[error("failed to parse note at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid encoding in {path}: {encoding}")]
    InvalidEncoding { path: String, encoding: String },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Maps an `io::Error` onto the closest store error.
    pub(crate) fn from_io(path: &str, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => StoreError::PermissionDenied { path: path.into() },
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists { path: path.into() },
            _ => StoreError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One file as stored, byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Everything under a folder: subfolders and files at any depth.
///
/// Includes hidden entries and files that are not notes. Folders are
/// ordered parents first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderContents {
    pub folders: Vec<String>,
    pub files: Vec<StoredFile>,
}

/// Normalizes and validates a caller-supplied path.
pub(crate) fn checked_path(path: &str) -> StoreResult<String> {
    if let Some(reason) = vault_path::validate(path) {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
            reason,
        });
    }
    Ok(vault_path::normalize(path))
}

/// Persistence for notes addressed by vault-relative path.
///
/// Each call is atomic on its own; there are no multi-call transactions.
/// Mutating calls take `&mut self`, so a batch holds the store exclusively.
pub trait NoteStore {
    /// Loads one note.
    fn read(&self, path: &str) -> StoreResult<Note>;

    /// Writes a note, creating it or (with `overwrite`) replacing it.
    ///
    /// Returns `AlreadyExists` if the note exists and `overwrite` is false,
    /// and `ParentNotFound` if the containing folder is missing.
    fn write(
        &mut self,
        path: &str,
        body: &str,
        metadata: Option<&Metadata>,
        overwrite: bool,
    ) -> StoreResult<()>;

    fn delete(&mut self, path: &str) -> StoreResult<()>;

    /// Removes a folder. A non-empty folder needs `recursive`.
    fn delete_folder(&mut self, path: &str, recursive: bool) -> StoreResult<()>;

    /// Moves a note. Fails with `AlreadyExists` if `dst` is taken.
    fn move_note(&mut self, src: &str, dst: &str, create_parents: bool) -> StoreResult<()>;

    /// Creates a folder and any missing ancestors.
    fn create_folder(&mut self, path: &str, exist_ok: bool) -> StoreResult<()>;

    /// Moves a folder subtree to a new path.
    fn move_folder(&mut self, src: &str, dst: &str) -> StoreResult<()>;

    /// Lists every note path in a stable order.
    fn list(&self) -> StoreResult<Vec<String>>;

    fn exists(&self, path: &str) -> bool;

    /// Returns true for existing folders, including the root `""`.
    fn folder_exists(&self, path: &str) -> bool;

    /// Reads every file and subfolder under `folder`.
    ///
    /// Fails if any entry cannot be read.
    fn folder_contents(&self, folder: &str) -> StoreResult<FolderContents>;

    /// Writes a file's raw bytes. The parent folder must exist.
    fn write_raw(&mut self, path: &str, bytes: &[u8], overwrite: bool) -> StoreResult<()>;

    /// Lists note paths inside `folder` at any depth.
    fn list_folder(&self, folder: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|p| vault_path::is_within(p, folder))
            .collect())
    }
}
