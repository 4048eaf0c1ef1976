//! Read-only handlers (find, classify).

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use super::{open_db, open_store, resolve_criteria, resolve_selection};
use crate::cli::output::{NoteListing, OutputFormat, print_json, truncate_str};
use crate::cli::{ClassifyArgs, FindArgs};
use crate::domain::Note;
use crate::engine::{Selection, discover};
use crate::search::{BoostPolicy, Classification, classify, prioritize, rank};
use crate::store::{FsStore, NoteStore};

/// Reads every path, skipping notes that vanished or fail to parse.
fn load_notes(store: &FsStore, paths: &[String]) -> Vec<Note> {
    paths
        .iter()
        .filter_map(|path| match store.read(path) {
            Ok(note) => Some(note),
            Err(err) => {
                warn!(path = %path, error = %err, "skipping unreadable note");
                None
            }
        })
        .collect()
}

fn listing(note: &Note, score: Option<f64>) -> NoteListing {
    NoteListing {
        path: note.path().to_string(),
        title: note.title().to_string(),
        tags: note.tags().into_iter().map(str::to_string).collect(),
        score,
    }
}

pub fn handle_find(args: &FindArgs, vault: &Path) -> Result<()> {
    let store = open_store(vault)?;
    let mut db = open_db(vault)?;
    let criteria = resolve_criteria(&args.criteria, &mut db)?;

    let paths = discover(&store, &criteria).with_context(|| "failed to search vault")?;
    let notes = load_notes(&store, &paths);

    let listings: Vec<NoteListing> = match &args.rank {
        Some(query) => {
            let ranked = prioritize(rank(&notes, query, &BoostPolicy::default()), None);
            ranked
                .into_iter()
                .filter_map(|scored| {
                    notes
                        .iter()
                        .find(|n| n.path() == scored.path)
                        .map(|n| listing(n, Some(scored.score)))
                })
                .collect()
        }
        None => notes.iter().map(|n| listing(n, None)).collect(),
    };

    match args.format {
        OutputFormat::Human => {
            if listings.is_empty() {
                println!("No notes found.");
            } else {
                for item in &listings {
                    let title = truncate_str(&item.title, 40);
                    match item.score {
                        Some(score) => println!("{:<40}  {:.2}  {}", title, score, item.path),
                        None => println!("{:<40}  {}", title, item.path),
                    }
                }
                println!();
                println!("{} note(s)", listings.len());
            }
        }
        OutputFormat::Json => print_json(&listings)?,
        OutputFormat::Paths => {
            for item in &listings {
                println!("{}", item.path);
            }
        }
    }
    Ok(())
}

pub fn handle_classify(args: &ClassifyArgs, vault: &Path) -> Result<()> {
    let store = open_store(vault)?;
    let mut db = open_db(vault)?;
    let selection = if args.select.targets.is_empty() && args.select.criteria.is_empty() {
        Selection::Criteria(Default::default())
    } else {
        resolve_selection(&args.select, &mut db)?
    };

    let paths = selection
        .resolve(&store)
        .with_context(|| "failed to search vault")?;
    let results: Vec<Classification> = load_notes(&store, &paths).iter().map(classify).collect();

    match args.format {
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No notes found.");
            }
            for result in &results {
                println!(
                    "{:<14} {:.2}  {}",
                    result.label, result.confidence, result.path
                );
                if !result.suggested_actions.is_empty() {
                    println!("  {}", result.suggested_actions.join("; "));
                }
            }
        }
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Paths => {
            for result in &results {
                println!("{}\t{}", result.label, result.path);
            }
        }
    }
    Ok(())
}
