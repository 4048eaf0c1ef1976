//! Isolated test environment with temp directory.

#![allow(dead_code)]

use super::{SheafCommand, TestNote};
use sheaf::domain::Note;
use sheaf::store::{FsStore, NoteStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary vault.
///
/// Creates a temp directory that is automatically cleaned up on drop.
/// The vault and the config home live side by side inside it, so a
/// developer's own config never leaks into a test.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    vault_dir: PathBuf,
    config_home: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment with an empty vault.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let vault_dir = temp_dir.path().join("vault");
        let config_home = temp_dir.path().join("config");
        std::fs::create_dir_all(&vault_dir).expect("Failed to create vault directory");
        std::fs::create_dir_all(&config_home).expect("Failed to create config directory");
        Self {
            _temp_dir: temp_dir,
            vault_dir,
            config_home,
        }
    }

    /// Returns the path to the vault directory.
    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Returns the path where the state database would be stored.
    pub fn state_path(&self) -> PathBuf {
        self.vault_dir.join(".sheaf").join("sheaf.db")
    }

    /// Writes a test note into the vault, creating parent folders.
    pub fn add_note(&self, test_note: &TestNote) -> PathBuf {
        let path = self.vault_dir.join(test_note.path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create note folder");
        }
        std::fs::write(&path, test_note.to_content()).expect("Failed to write test note");
        path
    }

    /// Creates an empty folder in the vault.
    pub fn add_folder(&self, folder: &str) -> PathBuf {
        let path = self.vault_dir.join(folder);
        std::fs::create_dir_all(&path).expect("Failed to create folder");
        path
    }

    /// Writes the sheaf config file for this environment.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let dir = self.config_home.join("sheaf");
        std::fs::create_dir_all(&dir).expect("Failed to create config folder");
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).expect("Failed to write config");
        path
    }

    /// Returns true if a vault-relative path exists on disk.
    pub fn exists(&self, path: &str) -> bool {
        self.vault_dir.join(path).exists()
    }

    /// Reads a note back through the store.
    pub fn read(&self, path: &str) -> Note {
        let store = FsStore::open(&self.vault_dir).expect("Failed to open vault");
        store.read(path).expect("Failed to read note")
    }

    /// Creates a SheafCommand configured for this test environment.
    pub fn cmd(&self) -> SheafCommand {
        SheafCommand::new()
            .config_home(&self.config_home)
            .dir(&self.vault_dir)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // Phase 3: TestEnv Foundation
    // ===========================================

    #[test]
    fn test_env_creates_vault() {
        let env = TestEnv::new();
        assert!(env.vault_dir().is_dir(), "vault should be a directory");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.vault_dir().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_state_path() {
        let env = TestEnv::new();
        let state = env.state_path();
        assert!(state.ends_with(".sheaf/sheaf.db"));
        assert!(state.starts_with(env.vault_dir()));
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], env.vault_dir().to_string_lossy());
    }

    #[test]
    fn test_env_add_note_in_subfolder() {
        let env = TestEnv::new();
        let path = env.add_note(&TestNote::new("Research/a.md").title("Alpha").tag("ml"));
        assert!(path.is_file());

        let note = env.read("Research/a.md");
        assert_eq!(note.title(), "Alpha");
        assert_eq!(note.tags(), vec!["ml"]);
    }
}
