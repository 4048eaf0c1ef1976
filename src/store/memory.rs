//! In-memory store for tests and embedding.

use crate::domain::{Metadata, Note, vault_path};
use crate::infra::{parse, serialize};
use crate::store::{
    FolderContents, NoteStore, StoreError, StoreResult, StoredFile, checked_path,
};
use std::collections::BTreeSet;

/// A store held entirely in memory.
///
/// Listing returns notes in insertion order. Folders are explicit: writing
/// a note needs its parent folder to exist, as on disk. Only notes are held,
/// so raw writes must decode as a note.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    notes: Vec<Note>,
    folders: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note, creating its parent folders.
    pub fn with_note(
        mut self,
        path: &str,
        body: &str,
        metadata: Option<Metadata>,
    ) -> Self {
        let path = vault_path::normalize(path);
        self.add_ancestors(vault_path::parent(&path).to_string());
        self.notes.retain(|n| n.path() != path);
        self.notes.push(Note::new(path, body, metadata));
        self
    }

    /// Adds an empty folder.
    pub fn with_folder(mut self, path: &str) -> Self {
        self.add_ancestors(vault_path::normalize(path));
        self
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.path() == path)
    }

    fn add_ancestors(&mut self, folder: String) {
        let mut current = folder;
        while !current.is_empty() {
            let parent = vault_path::parent(&current).to_string();
            self.folders.insert(current);
            current = parent;
        }
    }

    fn ensure_parent(&mut self, rel: &str, create: bool) -> StoreResult<()> {
        let parent = vault_path::parent(rel);
        if self.folder_exists(parent) {
            return Ok(());
        }
        if self.exists(parent) {
            return Err(StoreError::AlreadyExists {
                path: parent.to_string(),
            });
        }
        if !create {
            return Err(StoreError::ParentNotFound {
                path: parent.to_string(),
            });
        }
        self.add_ancestors(parent.to_string());
        Ok(())
    }
}

fn rebase(path: &str, src: &str, dst: &str) -> String {
    match path.strip_prefix(src) {
        Some(rest) => format!("{}{}", dst, rest),
        None => path.to_string(),
    }
}

impl NoteStore for MemoryStore {
    fn read(&self, path: &str) -> StoreResult<Note> {
        let rel = checked_path(path)?;
        self.position(&rel)
            .map(|i| self.notes[i].clone())
            .ok_or(StoreError::NotFound { path: rel })
    }

    fn write(
        &mut self,
        path: &str,
        body: &str,
        metadata: Option<&Metadata>,
        overwrite: bool,
    ) -> StoreResult<()> {
        let rel = checked_path(path)?;
        if self.folders.contains(&rel) {
            return Err(StoreError::AlreadyExists { path: rel });
        }

        let note = Note::new(rel.clone(), body, metadata.cloned());
        match self.position(&rel) {
            Some(_) if !overwrite => Err(StoreError::AlreadyExists { path: rel }),
            Some(i) => {
                self.notes[i] = note;
                Ok(())
            }
            None => {
                self.ensure_parent(&rel, false)?;
                self.notes.push(note);
                Ok(())
            }
        }
    }

    fn write_raw(&mut self, path: &str, bytes: &[u8], overwrite: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let content = std::str::from_utf8(bytes).map_err(|e| StoreError::InvalidEncoding {
            path: rel.clone(),
            encoding: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
        })?;
        let parsed = parse(content).map_err(|source| StoreError::Parse {
            path: rel.clone(),
            source,
        })?;
        self.write(&rel, &parsed.body, parsed.metadata.as_ref(), overwrite)
    }

    fn folder_contents(&self, folder: &str) -> StoreResult<FolderContents> {
        let rel = checked_path(folder)?;
        if !self.folders.contains(&rel) {
            return Err(StoreError::NotFound { path: rel });
        }

        let folders = self
            .folders
            .iter()
            .filter(|f| *f != &rel && vault_path::is_within(f, &rel))
            .cloned()
            .collect();
        let files = self
            .notes
            .iter()
            .filter(|n| vault_path::is_within(n.path(), &rel))
            .map(|n| -> StoreResult<StoredFile> {
                let content = serialize(n.metadata(), n.body()).map_err(|source| {
                    StoreError::Parse {
                        path: n.path().to_string(),
                        source,
                    }
                })?;
                Ok(StoredFile {
                    path: n.path().to_string(),
                    bytes: content.into_bytes(),
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(FolderContents { folders, files })
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let i = self
            .position(&rel)
            .ok_or(StoreError::NotFound { path: rel })?;
        self.notes.remove(i);
        Ok(())
    }

    fn delete_folder(&mut self, path: &str, recursive: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        if !self.folders.contains(&rel) {
            return Err(StoreError::NotFound { path: rel });
        }

        let has_notes = self
            .notes
            .iter()
            .any(|n| vault_path::is_within(n.path(), &rel));
        let has_folders = self
            .folders
            .iter()
            .any(|f| f != &rel && vault_path::is_within(f, &rel));
        if !recursive && (has_notes || has_folders) {
            return Err(StoreError::NotEmpty { path: rel });
        }

        self.notes.retain(|n| !vault_path::is_within(n.path(), &rel));
        self.folders.retain(|f| !vault_path::is_within(f, &rel));
        Ok(())
    }

    fn move_note(&mut self, src: &str, dst: &str, create_parents: bool) -> StoreResult<()> {
        let src_rel = checked_path(src)?;
        let dst_rel = checked_path(dst)?;
        let i = self
            .position(&src_rel)
            .ok_or(StoreError::NotFound { path: src_rel.clone() })?;
        if src_rel == dst_rel {
            return Ok(());
        }
        if self.exists(&dst_rel) || self.folders.contains(&dst_rel) {
            return Err(StoreError::AlreadyExists { path: dst_rel });
        }
        self.ensure_parent(&dst_rel, create_parents)?;

        let (body, metadata) = self.notes.remove(i).into_parts();
        self.notes.push(Note::new(dst_rel, body, metadata));
        Ok(())
    }

    fn create_folder(&mut self, path: &str, exist_ok: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        if self.exists(&rel) {
            return Err(StoreError::AlreadyExists { path: rel });
        }
        if self.folders.contains(&rel) {
            return if exist_ok {
                Ok(())
            } else {
                Err(StoreError::AlreadyExists { path: rel })
            };
        }
        self.add_ancestors(rel);
        Ok(())
    }

    fn move_folder(&mut self, src: &str, dst: &str) -> StoreResult<()> {
        let src_rel = checked_path(src)?;
        let dst_rel = checked_path(dst)?;
        if !self.folders.contains(&src_rel) {
            return Err(StoreError::NotFound { path: src_rel });
        }
        if vault_path::is_within(&dst_rel, &src_rel) {
            return Err(StoreError::InvalidPath {
                path: dst_rel,
                reason: "destination is inside the source folder",
            });
        }
        if self.folders.contains(&dst_rel) || self.exists(&dst_rel) {
            return Err(StoreError::AlreadyExists { path: dst_rel });
        }
        self.ensure_parent(&dst_rel, true)?;

        for note in &mut self.notes {
            if vault_path::is_within(note.path(), &src_rel) {
                let moved = rebase(note.path(), &src_rel, &dst_rel);
                let (body, metadata) = note.clone().into_parts();
                *note = Note::new(moved, body, metadata);
            }
        }
        let folders: Vec<String> = self
            .folders
            .iter()
            .filter(|f| vault_path::is_within(f, &src_rel))
            .cloned()
            .collect();
        for folder in folders {
            self.folders.remove(&folder);
            self.folders.insert(rebase(&folder, &src_rel, &dst_rel));
        }
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.notes.iter().map(|n| n.path().to_string()).collect())
    }

    fn exists(&self, path: &str) -> bool {
        let rel = vault_path::normalize(path);
        self.position(&rel).is_some()
    }

    fn folder_exists(&self, path: &str) -> bool {
        let rel = vault_path::normalize(path);
        rel.is_empty() || self.folders.contains(&rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_keeps_insertion_order() {
        let store = MemoryStore::new()
            .with_note("b.md", "", None)
            .with_note("a.md", "", None);
        assert_eq!(store.list().unwrap(), vec!["b.md", "a.md"]);
    }

    #[test]
    fn with_note_creates_parent_folders() {
        let store = MemoryStore::new().with_note("a/b/c.md", "", None);
        assert!(store.folder_exists("a"));
        assert!(store.folder_exists("a/b"));
    }

    #[test]
    fn write_requires_parent_folder() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.write("x/n.md", "", None, false),
            Err(StoreError::ParentNotFound { .. })
        ));
    }

    #[test]
    fn overwrite_keeps_listing_position() {
        let mut store = MemoryStore::new()
            .with_note("a.md", "1", None)
            .with_note("b.md", "2", None);
        store.write("a.md", "updated", None, true).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a.md", "b.md"]);
        assert_eq!(store.read("a.md").unwrap().body(), "updated");
    }

    #[test]
    fn delete_folder_checks_emptiness() {
        let mut store = MemoryStore::new().with_note("Old/a.md", "", None);
        assert!(matches!(
            store.delete_folder("Old", false),
            Err(StoreError::NotEmpty { .. })
        ));
        store.delete_folder("Old", true).unwrap();
        assert!(store.is_empty());
        assert!(!store.folder_exists("Old"));
    }

    #[test]
    fn nested_empty_folder_counts_as_content() {
        let mut store = MemoryStore::new().with_folder("Old/inner");
        assert!(matches!(
            store.delete_folder("Old", false),
            Err(StoreError::NotEmpty { .. })
        ));
    }

    #[test]
    fn folder_contents_round_trips_through_write_raw() {
        let mut source = Metadata::new();
        source.insert("title", "A");
        let store = MemoryStore::new()
            .with_note("Old/a.md", "body\n", Some(source))
            .with_folder("Old/empty");

        let contents = store.folder_contents("Old").unwrap();
        assert_eq!(contents.folders, vec!["Old/empty"]);

        let mut copy = MemoryStore::new().with_folder("Old");
        for file in &contents.files {
            copy.write_raw(&file.path, &file.bytes, false).unwrap();
        }
        let note = copy.read("Old/a.md").unwrap();
        assert_eq!(note.title(), "A");
        assert_eq!(note.body(), "body\n");
    }

    #[test]
    fn move_folder_rebases_contents() {
        let mut store = MemoryStore::new()
            .with_note("Old/a.md", "", None)
            .with_note("Older/b.md", "", None);
        store.move_folder("Old", "Archive/Old").unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec!["Archive/Old/a.md", "Older/b.md"]
        );
        assert!(store.folder_exists("Archive"));
        assert!(!store.folder_exists("Old"));
    }

    #[test]
    fn move_note_creates_parents_on_request() {
        let mut store = MemoryStore::new().with_note("a.md", "x", None);
        assert!(store.move_note("a.md", "Archive/a.md", false).is_err());
        store.move_note("a.md", "Archive/a.md", true).unwrap();
        assert_eq!(store.read("Archive/a.md").unwrap().body(), "x");
    }
}
