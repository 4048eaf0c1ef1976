//! Journal handlers (undo, history).

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::{open_db, open_store};
use crate::cli::output::{HistoryListing, OutputFormat, print_json, print_report};
use crate::cli::{HistoryArgs, UndoArgs};
use crate::engine::undo_pending;

pub fn handle_undo(args: &UndoArgs, vault: &Path) -> Result<()> {
    let db = open_db(vault)?;
    let history = match &args.id {
        Some(id) => db
            .load_operation(id)
            .with_context(|| format!("failed to load operation {}", id))?,
        None => match db
            .latest_undoable()
            .with_context(|| "failed to read operation history")?
        {
            Some(history) => history,
            None => bail!("nothing to undo"),
        },
    };

    if !history.is_undoable() {
        bail!("operation {} cannot be undone (already undone or nothing recorded)", history.id);
    }

    let mut store = open_store(vault)?;
    let (report, pending) = undo_pending(&mut store, &history);
    if pending.is_empty() {
        db.mark_undone(&history.id)
            .with_context(|| format!("failed to mark operation {} as undone", history.id))?;
    } else {
        db.retain_snapshots(&history.id, &pending)
            .with_context(|| format!("failed to update operation {}", history.id))?;
    }

    print_report(&report, args.format)?;
    if !pending.is_empty() {
        bail!(
            "undo of {} failed for {} item(s); fix the cause and run undo again",
            history.id,
            pending.len()
        );
    }
    Ok(())
}

pub fn handle_history(args: &HistoryArgs, vault: &Path) -> Result<()> {
    let db = open_db(vault)?;
    let entries = db
        .list_operations(args.limit)
        .with_context(|| "failed to read operation history")?;

    let listings: Vec<HistoryListing> = entries
        .iter()
        .map(|h| HistoryListing {
            id: h.id.clone(),
            timestamp: h.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            operation: h.operation.to_string(),
            affected: h.affected_paths.len(),
            undoable: h.is_undoable(),
        })
        .collect();

    match args.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("No operations recorded.");
            }
            for entry in &listings {
                let state = if entry.undoable { "" } else { " (undone)" };
                println!(
                    "{}  {}  {:<18} {} item(s){}",
                    entry.id, entry.timestamp, entry.operation, entry.affected, state
                );
            }
        }
        OutputFormat::Json => print_json(&listings)?,
        OutputFormat::Paths => {
            for entry in &entries {
                for path in &entry.affected_paths {
                    println!("{}", path);
                }
            }
        }
    }
    Ok(())
}
