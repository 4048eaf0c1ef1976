//! Note batch handlers (tag, set, mv, append, rm).

use anyhow::Result;
use std::path::Path;

use super::{execute, open_db, resolve_selection};
use crate::cli::config::Config;
use crate::cli::fields::parse_fields;
use crate::cli::{AppendArgs, MvArgs, RmArgs, SetArgs, TagArgs};
use crate::engine::Mutation;

pub fn handle_tag(args: &TagArgs, vault: &Path, config: &Config) -> Result<()> {
    // Parse fields before any I/O
    let extra = parse_fields(&args.fields)?;
    let mutation = Mutation::MergeTags {
        tags: args.tags.clone(),
        extra,
    };

    let mut db = open_db(vault)?;
    let selection = resolve_selection(&args.select, &mut db)?;
    execute(vault, config, selection, mutation, &args.run)
}

pub fn handle_set(args: &SetArgs, vault: &Path, config: &Config) -> Result<()> {
    let fields = parse_fields(&args.fields)?;
    let mutation = Mutation::OverwriteMetadata { fields };

    let mut db = open_db(vault)?;
    let selection = resolve_selection(&args.select, &mut db)?;
    execute(vault, config, selection, mutation, &args.run)
}

pub fn handle_mv(args: &MvArgs, vault: &Path, config: &Config) -> Result<()> {
    let mutation = Mutation::relocate(&args.to, args.create_folders || config.create_folders);

    let mut db = open_db(vault)?;
    let selection = resolve_selection(&args.select, &mut db)?;
    execute(vault, config, selection, mutation, &args.run)
}

pub fn handle_append(args: &AppendArgs, vault: &Path, config: &Config) -> Result<()> {
    let mutation = Mutation::Append {
        text: args.text.clone(),
    };

    let mut db = open_db(vault)?;
    let selection = resolve_selection(&args.select, &mut db)?;
    execute(vault, config, selection, mutation, &args.run)
}

pub fn handle_rm(args: &RmArgs, vault: &Path, config: &Config) -> Result<()> {
    let mut db = open_db(vault)?;
    let selection = resolve_selection(&args.select, &mut db)?;
    execute(vault, config, selection, Mutation::DeleteNote, &args.run)
}
