//! Single-note handlers (new, write).

use anyhow::Result;
use std::path::Path;

use super::execute;
use crate::cli::config::Config;
use crate::cli::fields::parse_fields;
use crate::cli::output::OutputFormat;
use crate::cli::{NewArgs, RunArgs, WriteArgs};
use crate::domain::vault_path;
use crate::engine::{Mutation, Selection};

/// A single named path needs no extra confirmation.
fn single(format: OutputFormat) -> RunArgs {
    RunArgs {
        dry_run: false,
        yes: true,
        format,
    }
}

pub fn handle_new(args: &NewArgs, vault: &Path, config: &Config) -> Result<()> {
    let mut metadata = parse_fields(&args.fields)?;
    if !args.tags.is_empty() {
        metadata.set_tags(args.tags.iter().cloned());
    }

    let mutation = Mutation::Create {
        body: args.body.clone(),
        metadata: (!metadata.is_empty()).then_some(metadata),
        overwrite: args.overwrite,
        create_folders: args.create_folders || config.create_folders,
    };
    let selection = Selection::Targets(vec![vault_path::normalize(&args.path)]);
    execute(vault, config, selection, mutation, &single(args.format))
}

pub fn handle_write(args: &WriteArgs, vault: &Path, config: &Config) -> Result<()> {
    let fields = parse_fields(&args.fields)?;
    let mutation = Mutation::Update {
        body: args.body.clone(),
        metadata: (!fields.is_empty()).then_some(fields),
    };
    let selection = Selection::Targets(vec![vault_path::normalize(&args.path)]);
    execute(vault, config, selection, mutation, &single(args.format))
}
