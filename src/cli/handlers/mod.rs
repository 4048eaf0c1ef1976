//! Command handlers for the CLI.

mod bulk;
mod find;
mod folder;
mod history;
mod note;
mod pattern;

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::cli::config::Config;
use crate::cli::output::{OutputFormat, print_preview, print_report};
use crate::cli::{CriteriaArgs, RunArgs, SelectArgs};
use crate::domain::{SelectionCriteria, vault_path};
use crate::engine::{BulkRequest, Mutation, Selection, preview, run_bulk_recorded};
use crate::persist::{Database, PatternStore};
use crate::store::FsStore;

// Re-export public items
pub use bulk::{handle_append, handle_mv, handle_rm, handle_set, handle_tag};
pub use find::{handle_classify, handle_find};
pub use folder::{handle_mkdir, handle_mvdir, handle_rmdir};
pub use history::{handle_history, handle_undo};
pub use note::{handle_new, handle_write};
pub use pattern::handle_pattern;

// ===========================================
// Shared Utilities
// ===========================================

pub(crate) fn open_store(vault: &Path) -> Result<FsStore> {
    FsStore::open(vault).with_context(|| format!("failed to open vault at {}", vault.display()))
}

pub(crate) fn open_db(vault: &Path) -> Result<Database> {
    Database::open_for_vault(vault)
        .with_context(|| format!("failed to open state database in {}", vault.display()))
}

/// Builds criteria from flags, starting from a saved pattern if one is named.
pub(crate) fn resolve_criteria(
    args: &CriteriaArgs,
    db: &mut Database,
) -> Result<SelectionCriteria> {
    let base = match &args.pattern {
        Some(name) => {
            let pattern = db
                .load(name)
                .with_context(|| format!("failed to load pattern '{}'", name))?;
            db.mark_used(name)
                .with_context(|| format!("failed to update pattern '{}'", name))?;
            pattern.criteria
        }
        None => SelectionCriteria::new(),
    };
    Ok(args.apply_to(base))
}

/// Turns positional paths or criteria flags into a selection.
///
/// Exactly one of the two must be given; `--all` selects the whole vault.
pub(crate) fn resolve_selection(select: &SelectArgs, db: &mut Database) -> Result<Selection> {
    if !select.targets.is_empty() {
        if !select.criteria.is_empty() {
            bail!("give either note paths or criteria flags, not both");
        }
        let targets = select
            .targets
            .iter()
            .map(|t| vault_path::normalize(t))
            .collect();
        return Ok(Selection::Targets(targets));
    }
    if select.criteria.is_empty() {
        bail!("no notes selected: give note paths, criteria flags, or --all");
    }
    Ok(Selection::Criteria(resolve_criteria(&select.criteria, db)?))
}

/// Previews, gates, runs and journals one bulk operation.
///
/// Batches at or above the configured risk tier need `--yes`. The same
/// flag confirms destructive operations.
pub(crate) fn execute(
    vault: &Path,
    config: &Config,
    selection: Selection,
    mutation: Mutation,
    run: &RunArgs,
) -> Result<()> {
    let mut store = open_store(vault)?;
    let forecast = preview(&store, &selection, &mutation)?;

    if run.dry_run {
        return print_preview(&forecast, run.format);
    }

    let tier = config.confirm_tier();
    if !forecast.targets.is_empty() && forecast.risk >= tier && !run.yes {
        bail!(
            "{} {} selected ({} risk); re-run with --yes to proceed",
            forecast.targets.len(),
            forecast.operation.entities(),
            forecast.risk
        );
    }

    let request = BulkRequest::new(selection, mutation).confirmed(run.yes);
    let (report, history) = run_bulk_recorded(&mut store, &request)?;

    if history.is_undoable() {
        let db = open_db(vault)?;
        db.record(&history)
            .with_context(|| "failed to record operation for undo")?;
    }

    print_report(&report, run.format)?;
    if matches!(run.format, OutputFormat::Human) && history.is_undoable() {
        println!("undo id: {}", history.id);
    }

    if !report.is_success() {
        if report.operation().is_destructive() && !run.yes {
            bail!("{} requires --yes", report.operation());
        }
        bail!("no {} were changed", report.operation().entities());
    }
    Ok(())
}
