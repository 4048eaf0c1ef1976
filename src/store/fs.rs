//! Filesystem-backed store: markdown files with YAML frontmatter.

use crate::domain::{Metadata, Note, vault_path};
use crate::infra::{parse, serialize};
use crate::store::{
    FolderContents, NoteStore, StoreError, StoreResult, StoredFile, checked_path,
};
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

/// A vault rooted at a directory on disk.
///
/// Notes are `.md` files. Hidden files and directories (starting with `.`)
/// are invisible to listing, which keeps the `.sheaf/` state directory out
/// of every scan.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens a vault at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotFound {
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn abs(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn ensure_parent(&self, rel: &str, create: bool) -> StoreResult<()> {
        let parent = vault_path::parent(rel);
        let abs = self.abs(parent);
        if abs.is_dir() {
            return Ok(());
        }
        if abs.exists() {
            return Err(StoreError::AlreadyExists {
                path: parent.to_string(),
            });
        }
        if !create {
            return Err(StoreError::ParentNotFound {
                path: parent.to_string(),
            });
        }
        fs::create_dir_all(&abs).map_err(|e| StoreError::from_io(parent, e))
    }
}

/// Decodes raw note bytes, rejecting encodings the codec cannot round-trip.
fn decode(rel: &str, bytes: Vec<u8>) -> StoreResult<String> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(StoreError::InvalidEncoding {
            path: rel.into(),
            encoding: "UTF-16 LE detected (byte order mark FF FE); convert to UTF-8".into(),
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(StoreError::InvalidEncoding {
            path: rel.into(),
            encoding: "UTF-16 BE detected (byte order mark FE FF); convert to UTF-8".into(),
        });
    }

    let content = String::from_utf8(bytes).map_err(|e| StoreError::InvalidEncoding {
        path: rel.into(),
        encoding: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}

/// Writes through a temp file in the same directory and renames it over
/// the target.
fn write_atomic(abs: &Path, rel: &str, content: &[u8]) -> StoreResult<()> {
    let parent = abs.parent().ok_or_else(|| StoreError::ParentNotFound {
        path: rel.to_string(),
    })?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| StoreError::from_io(rel, e))?;
    temp.write_all(content)
        .map_err(|e| StoreError::from_io(rel, e))?;
    temp.persist(abs)
        .map_err(|e| StoreError::from_io(rel, e.error))?;
    Ok(())
}

impl NoteStore for FsStore {
    fn read(&self, path: &str) -> StoreResult<Note> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);
        if abs.is_dir() {
            return Err(StoreError::NotFound { path: rel });
        }

        let bytes = fs::read(&abs).map_err(|e| StoreError::from_io(&rel, e))?;
        let content = decode(&rel, bytes)?;
        let parsed = parse(&content).map_err(|source| StoreError::Parse {
            path: rel.clone(),
            source,
        })?;
        Ok(Note::new(rel, parsed.body, parsed.metadata))
    }

    fn write(
        &mut self,
        path: &str,
        body: &str,
        metadata: Option<&Metadata>,
        overwrite: bool,
    ) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);

        if abs.is_dir() || (abs.exists() && !overwrite) {
            return Err(StoreError::AlreadyExists { path: rel });
        }
        self.ensure_parent(&rel, false)?;

        let content = serialize(metadata, body).map_err(|source| StoreError::Parse {
            path: rel.clone(),
            source,
        })?;
        write_atomic(&abs, &rel, content.as_bytes())
    }

    fn write_raw(&mut self, path: &str, bytes: &[u8], overwrite: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);

        if abs.is_dir() || (abs.exists() && !overwrite) {
            return Err(StoreError::AlreadyExists { path: rel });
        }
        self.ensure_parent(&rel, false)?;
        write_atomic(&abs, &rel, bytes)
    }

    fn folder_contents(&self, folder: &str) -> StoreResult<FolderContents> {
        let rel = checked_path(folder)?;
        let abs = self.abs(&rel);
        if !abs.is_dir() {
            return Err(StoreError::NotFound { path: rel });
        }

        let mut contents = FolderContents::default();
        for entry in WalkDir::new(&abs).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| StoreError::from_io(&rel, e.into()))?;
            let Some(key) = relative_key(&self.root, entry.path()) else {
                continue;
            };
            if entry.file_type().is_dir() {
                contents.folders.push(key);
            } else {
                let bytes = fs::read(entry.path()).map_err(|e| StoreError::from_io(&key, e))?;
                contents.files.push(StoredFile { path: key, bytes });
            }
        }
        Ok(contents)
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);
        if !abs.is_file() {
            return Err(StoreError::NotFound { path: rel });
        }
        fs::remove_file(&abs).map_err(|e| StoreError::from_io(&rel, e))
    }

    fn delete_folder(&mut self, path: &str, recursive: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);
        if !abs.is_dir() {
            return Err(StoreError::NotFound { path: rel });
        }

        if recursive {
            return fs::remove_dir_all(&abs).map_err(|e| StoreError::from_io(&rel, e));
        }

        let mut entries = fs::read_dir(&abs).map_err(|e| StoreError::from_io(&rel, e))?;
        if entries.next().is_some() {
            return Err(StoreError::NotEmpty { path: rel });
        }
        fs::remove_dir(&abs).map_err(|e| StoreError::from_io(&rel, e))
    }

    fn move_note(&mut self, src: &str, dst: &str, create_parents: bool) -> StoreResult<()> {
        let src_rel = checked_path(src)?;
        let dst_rel = checked_path(dst)?;
        let src_abs = self.abs(&src_rel);
        let dst_abs = self.abs(&dst_rel);

        if !src_abs.is_file() {
            return Err(StoreError::NotFound { path: src_rel });
        }
        if src_rel == dst_rel {
            return Ok(());
        }
        if dst_abs.exists() {
            return Err(StoreError::AlreadyExists { path: dst_rel });
        }
        self.ensure_parent(&dst_rel, create_parents)?;

        fs::rename(&src_abs, &dst_abs).map_err(|e| StoreError::from_io(&src_rel, e))
    }

    fn create_folder(&mut self, path: &str, exist_ok: bool) -> StoreResult<()> {
        let rel = checked_path(path)?;
        let abs = self.abs(&rel);

        if abs.is_dir() {
            return if exist_ok {
                Ok(())
            } else {
                Err(StoreError::AlreadyExists { path: rel })
            };
        }
        if abs.exists() {
            return Err(StoreError::AlreadyExists { path: rel });
        }
        fs::create_dir_all(&abs).map_err(|e| StoreError::from_io(&rel, e))
    }

    fn move_folder(&mut self, src: &str, dst: &str) -> StoreResult<()> {
        let src_rel = checked_path(src)?;
        let dst_rel = checked_path(dst)?;
        let src_abs = self.abs(&src_rel);
        let dst_abs = self.abs(&dst_rel);

        if !src_abs.is_dir() {
            return Err(StoreError::NotFound { path: src_rel });
        }
        if vault_path::is_within(&dst_rel, &src_rel) {
            return Err(StoreError::InvalidPath {
                path: dst_rel,
                reason: "destination is inside the source folder",
            });
        }
        if dst_abs.exists() {
            return Err(StoreError::AlreadyExists { path: dst_rel });
        }
        self.ensure_parent(&dst_rel, true)?;

        fs::rename(&src_abs, &dst_abs).map_err(|e| StoreError::from_io(&src_rel, e))
    }

    fn list(&self) -> StoreResult<Vec<String>> {
        if !self.root.is_dir() {
            return Err(StoreError::NotFound {
                path: self.root.display().to_string(),
            });
        }

        let paths = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(has_md_extension)
            .filter_map(|e| relative_key(&self.root, e.path()))
            .collect();

        Ok(paths)
    }

    fn exists(&self, path: &str) -> bool {
        checked_path(path).is_ok_and(|rel| self.abs(&rel).is_file())
    }

    fn folder_exists(&self, path: &str) -> bool {
        let rel = vault_path::normalize(path);
        if rel.is_empty() {
            return self.root.is_dir();
        }
        checked_path(&rel).is_ok_and(|rel| self.abs(&rel).is_dir())
    }
}

/// Converts an absolute path under `root` to a `/`-separated key.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn has_md_extension(entry: &DirEntry) -> bool {
    entry.path().extension().is_some_and(|e| e == "md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    // ===========================================
    // Test Helpers
    // ===========================================

    fn vault() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn put(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn tagged(tags: &[&str]) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.set_tags(tags.iter().map(|t| t.to_string()));
        metadata
    }

    // ===========================================
    // Cycle 1: Open and read
    // ===========================================

    #[test]
    fn open_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            FsStore::open(missing),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn read_parses_frontmatter() {
        let (dir, store) = vault();
        put(&dir, "a.md", "---\ntags: [x]\n---\nhello\n");

        let note = store.read("a.md").unwrap();
        assert_eq!(note.path(), "a.md");
        assert_eq!(note.tags(), vec!["x"]);
        assert_eq!(note.body(), "hello\n");
    }

    #[test]
    fn read_plain_file_has_no_metadata() {
        let (dir, store) = vault();
        put(&dir, "plain.md", "just text");
        let note = store.read("plain.md").unwrap();
        assert!(note.metadata().is_none());
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_dir, store) = vault();
        assert!(matches!(
            store.read("ghost.md"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn read_strips_utf8_bom() {
        let (dir, store) = vault();
        put(&dir, "bom.md", "\u{FEFF}---\ntitle: B\n---\n");
        assert_eq!(store.read("bom.md").unwrap().title(), "B");
    }

    #[test]
    fn read_rejects_utf16() {
        let (dir, store) = vault();
        fs::write(dir.path().join("wide.md"), [0xFF, 0xFE, b'a', 0]).unwrap();
        assert!(matches!(
            store.read("wide.md"),
            Err(StoreError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn read_bad_yaml_is_parse_error() {
        let (dir, store) = vault();
        put(&dir, "bad.md", "---\n- a\n---\n");
        assert!(matches!(
            store.read("bad.md"),
            Err(StoreError::Parse { .. })
        ));
    }

    // ===========================================
    // Cycle 2: Write
    // ===========================================

    #[test]
    fn write_then_read() {
        let (_dir, mut store) = vault();
        store
            .write("n.md", "body\n", Some(&tagged(&["a"])), false)
            .unwrap();
        let note = store.read("n.md").unwrap();
        assert_eq!(note.tags(), vec!["a"]);
        assert_eq!(note.body(), "body\n");
    }

    #[test]
    fn write_refuses_overwrite_by_default() {
        let (dir, mut store) = vault();
        put(&dir, "n.md", "old");
        assert!(matches!(
            store.write("n.md", "new", None, false),
            Err(StoreError::AlreadyExists { .. })
        ));
        store.write("n.md", "new", None, true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("n.md")).unwrap(), "new");
    }

    #[test]
    fn write_requires_parent() {
        let (_dir, mut store) = vault();
        assert!(matches!(
            store.write("missing/n.md", "x", None, false),
            Err(StoreError::ParentNotFound { .. })
        ));
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (dir, mut store) = vault();
        store.write("n.md", "x", None, false).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_rejects_traversal() {
        let (_dir, mut store) = vault();
        assert!(matches!(
            store.write("../escape.md", "x", None, false),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    // ===========================================
    // Cycle 3: Listing
    // ===========================================

    #[test]
    fn list_is_sorted_and_skips_hidden() {
        let (dir, store) = vault();
        put(&dir, "b.md", "");
        put(&dir, "a.md", "");
        put(&dir, "sub/c.md", "");
        put(&dir, ".sheaf/state.md", "");
        put(&dir, ".hidden.md", "");
        put(&dir, "notes.txt", "");

        assert_eq!(store.list().unwrap(), vec!["a.md", "b.md", "sub/c.md"]);
    }

    #[test]
    fn list_folder_is_separator_aware() {
        let (dir, store) = vault();
        put(&dir, "Projects/a.md", "");
        put(&dir, "Projects/sub/b.md", "");
        put(&dir, "ProjectsX/c.md", "");

        assert_eq!(
            store.list_folder("Projects").unwrap(),
            vec!["Projects/a.md", "Projects/sub/b.md"]
        );
    }

    #[test]
    fn folder_contents_includes_every_entry() {
        let (dir, store) = vault();
        put(&dir, "Old/a.md", "note");
        put(&dir, "Old/.hidden", "h");
        fs::write(dir.path().join("Old/diagram.png"), [0x89, 0x50, 0xFF]).unwrap();
        fs::create_dir_all(dir.path().join("Old/empty")).unwrap();

        let contents = store.folder_contents("Old").unwrap();
        assert_eq!(contents.folders, vec!["Old/empty"]);
        let paths: Vec<&str> = contents.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["Old/.hidden", "Old/a.md", "Old/diagram.png"]);
        assert_eq!(contents.files[2].bytes, vec![0x89, 0x50, 0xFF]);
    }

    #[test]
    fn write_raw_keeps_bytes_exactly() {
        let (dir, mut store) = vault();
        let bytes = [0xFF, 0xFE, b'x', 0x00];
        store.write_raw("blob.bin", &bytes, false).unwrap();
        assert_eq!(fs::read(dir.path().join("blob.bin")).unwrap(), bytes);
        assert!(matches!(
            store.write_raw("blob.bin", &bytes, false),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    // ===========================================
    // Cycle 4: Delete and move
    // ===========================================

    #[test]
    fn delete_removes_file() {
        let (dir, mut store) = vault();
        put(&dir, "a.md", "");
        store.delete("a.md").unwrap();
        assert!(!store.exists("a.md"));
        assert!(matches!(
            store.delete("a.md"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_folder_non_recursive_requires_empty() {
        let (dir, mut store) = vault();
        put(&dir, "Old/a.md", "");
        assert!(matches!(
            store.delete_folder("Old", false),
            Err(StoreError::NotEmpty { .. })
        ));
        assert!(store.exists("Old/a.md"));

        store.delete_folder("Old", true).unwrap();
        assert!(!store.folder_exists("Old"));
    }

    #[test]
    fn delete_empty_folder() {
        let (_dir, mut store) = vault();
        store.create_folder("Empty", false).unwrap();
        store.delete_folder("Empty", false).unwrap();
        assert!(!store.folder_exists("Empty"));
    }

    #[test]
    fn move_note_creates_parents_on_request() {
        let (dir, mut store) = vault();
        put(&dir, "a.md", "x");

        assert!(matches!(
            store.move_note("a.md", "Archive/a.md", false),
            Err(StoreError::ParentNotFound { .. })
        ));
        store.move_note("a.md", "Archive/a.md", true).unwrap();
        assert!(store.exists("Archive/a.md"));
        assert!(!store.exists("a.md"));
    }

    #[test]
    fn move_note_refuses_existing_destination() {
        let (dir, mut store) = vault();
        put(&dir, "a.md", "src");
        put(&dir, "Archive/a.md", "dst");
        assert!(matches!(
            store.move_note("a.md", "Archive/a.md", true),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert_eq!(store.read("a.md").unwrap().body(), "src");
    }

    #[test]
    fn move_folder_moves_subtree() {
        let (dir, mut store) = vault();
        put(&dir, "Old/a.md", "");
        put(&dir, "Old/deep/b.md", "");

        store.move_folder("Old", "Archive/Old").unwrap();
        assert_eq!(
            store.list().unwrap(),
            vec!["Archive/Old/a.md", "Archive/Old/deep/b.md"]
        );
    }

    #[test]
    fn move_folder_into_itself_is_rejected() {
        let (dir, mut store) = vault();
        put(&dir, "Old/a.md", "");
        assert!(matches!(
            store.move_folder("Old", "Old/inner"),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn create_folder_respects_exist_ok() {
        let (_dir, mut store) = vault();
        store.create_folder("a/b", false).unwrap();
        assert!(store.folder_exists("a"));
        assert!(store.create_folder("a/b", true).is_ok());
        assert!(matches!(
            store.create_folder("a/b", false),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn root_folder_always_exists() {
        let (_dir, store) = vault();
        assert!(store.folder_exists(""));
    }
}
