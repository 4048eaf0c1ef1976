//! Store wrapper that records every call, for engine tests.

use crate::domain::{Metadata, Note};
use crate::store::{FolderContents, MemoryStore, NoteStore, StoreError, StoreResult};
use std::cell::RefCell;

pub(crate) struct RecordingStore {
    pub inner: MemoryStore,
    calls: RefCell<Vec<String>>,
    unreadable_folders: bool,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
            unreadable_folders: false,
        }
    }

    /// Makes `folder_contents` fail with a permission error.
    pub fn with_unreadable_folders(mut self) -> Self {
        self.unreadable_folders = true;
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Number of recorded calls to the named method.
    pub fn count(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl NoteStore for RecordingStore {
    fn read(&self, path: &str) -> StoreResult<Note> {
        self.record(format!("read {}", path));
        self.inner.read(path)
    }

    fn write(
        &mut self,
        path: &str,
        body: &str,
        metadata: Option<&Metadata>,
        overwrite: bool,
    ) -> StoreResult<()> {
        self.record(format!("write {}", path));
        self.inner.write(path, body, metadata, overwrite)
    }

    fn write_raw(&mut self, path: &str, bytes: &[u8], overwrite: bool) -> StoreResult<()> {
        self.record(format!("write_raw {}", path));
        self.inner.write_raw(path, bytes, overwrite)
    }

    fn folder_contents(&self, folder: &str) -> StoreResult<FolderContents> {
        self.record(format!("folder_contents {}", folder));
        if self.unreadable_folders {
            return Err(StoreError::PermissionDenied {
                path: folder.to_string(),
            });
        }
        self.inner.folder_contents(folder)
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        self.record(format!("delete {}", path));
        self.inner.delete(path)
    }

    fn delete_folder(&mut self, path: &str, recursive: bool) -> StoreResult<()> {
        self.record(format!("delete_folder {}", path));
        self.inner.delete_folder(path, recursive)
    }

    fn move_note(&mut self, src: &str, dst: &str, create_parents: bool) -> StoreResult<()> {
        self.record(format!("move_note {} {}", src, dst));
        self.inner.move_note(src, dst, create_parents)
    }

    fn create_folder(&mut self, path: &str, exist_ok: bool) -> StoreResult<()> {
        self.record(format!("create_folder {}", path));
        self.inner.create_folder(path, exist_ok)
    }

    fn move_folder(&mut self, src: &str, dst: &str) -> StoreResult<()> {
        self.record(format!("move_folder {} {}", src, dst));
        self.inner.move_folder(src, dst)
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        self.record("list");
        self.inner.list()
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }

    fn folder_exists(&self, path: &str) -> bool {
        self.inner.folder_exists(path)
    }
}
