//! Folder handlers (mkdir, rmdir, mvdir).

use anyhow::Result;
use std::path::Path;

use super::execute;
use crate::cli::config::Config;
use crate::cli::{MkdirArgs, MvdirArgs, RmdirArgs, RunArgs};
use crate::domain::vault_path;
use crate::engine::{Mutation, Selection};

fn folders(paths: &[String]) -> Selection {
    Selection::Targets(paths.iter().map(|p| vault_path::normalize(p)).collect())
}

pub fn handle_mkdir(args: &MkdirArgs, vault: &Path, config: &Config) -> Result<()> {
    let run = RunArgs {
        dry_run: false,
        yes: true,
        format: args.format,
    };
    let mutation = Mutation::CreateFolder {
        exist_ok: args.exist_ok,
    };
    execute(vault, config, folders(&args.paths), mutation, &run)
}

pub fn handle_rmdir(args: &RmdirArgs, vault: &Path, config: &Config) -> Result<()> {
    let mutation = Mutation::DeleteFolder {
        recursive: args.recursive,
    };
    execute(vault, config, folders(&args.paths), mutation, &args.run)
}

pub fn handle_mvdir(args: &MvdirArgs, vault: &Path, config: &Config) -> Result<()> {
    let mutation = Mutation::MoveFolder {
        destination: args.to.clone(),
    };
    execute(vault, config, folders(&args.paths), mutation, &args.run)
}
