//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since this is a test utility shared by several test crates
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Fluent wrapper around `assert_cmd::Command` for the `sheaf` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct SheafCommand {
    args: Vec<String>,
    config_home: Option<PathBuf>,
}

impl SheafCommand {
    /// Creates a new command for the `sheaf` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            config_home: None,
        }
    }

    /// Sets the `--dir` option to specify the vault directory.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Points the config lookup at `path` instead of the user's config.
    pub fn config_home(mut self, path: &Path) -> Self {
        self.config_home = Some(path.to_path_buf());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("sheaf").expect("Failed to find sheaf binary");
        cmd.env_remove("RUST_LOG");
        if let Some(home) = &self.config_home {
            cmd.env("XDG_CONFIG_HOME", home);
        }
        cmd.args(&self.args);
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `find` command.
    pub fn find(self) -> Self {
        self.args(["find"])
    }

    /// Configures for the `tag` command with one tag.
    pub fn tag(self, tag: &str) -> Self {
        self.args(["tag", "--tag", tag])
    }

    /// Configures for the `mv` command with a destination folder.
    pub fn mv(self, folder: &str) -> Self {
        self.args(["mv", "--to", folder])
    }

    /// Configures for the `rm` command.
    pub fn rm(self) -> Self {
        self.args(["rm"])
    }

    /// Configures for the `undo` command.
    pub fn undo(self) -> Self {
        self.args(["undo"])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }

    /// Adds `--format paths` to the command.
    pub fn format_paths(self) -> Self {
        self.args(["--format", "paths"])
    }
}

impl Default for SheafCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ===========================================
    // Phase 1: SheafCommand Basics
    // ===========================================

    #[test]
    fn test_command_runs_binary() {
        SheafCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_dir() {
        let temp = TempDir::new().unwrap();
        let cmd = SheafCommand::new().dir(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_output_success() {
        let output = SheafCommand::new().args(["--help"]).output_success();
        assert!(output.contains("sheaf") || output.contains("vault"));
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = SheafCommand::new().tag("ai").format_json();
        let args = cmd.get_args();
        assert!(args.contains(&"tag".to_string()));
        assert!(args.contains(&"ai".to_string()));
        assert!(args.contains(&"json".to_string()));
    }
}
