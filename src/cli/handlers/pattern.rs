//! Pattern library handlers.

use anyhow::{Context, Result, bail};
use std::path::Path;

use super::open_db;
use crate::cli::output::{OutputFormat, print_json};
use crate::cli::{PatternCommand, PatternListArgs, PatternSaveArgs, PatternShowArgs};
use crate::persist::{Database, PatternStore, SearchPattern};

pub fn handle_pattern(command: &PatternCommand, vault: &Path) -> Result<()> {
    let mut db = open_db(vault)?;
    match command {
        PatternCommand::Save(args) => save(args, &mut db),
        PatternCommand::List(args) => list(args, &db),
        PatternCommand::Show(args) => show(args, &db),
        PatternCommand::Rm(args) => {
            db.remove(&args.name)
                .with_context(|| format!("failed to remove pattern '{}'", args.name))?;
            println!("Removed pattern {}", args.name);
            Ok(())
        }
    }
}

fn save(args: &PatternSaveArgs, db: &mut Database) -> Result<()> {
    if args.criteria.pattern.is_some() {
        bail!("--pattern cannot be used when saving a pattern");
    }
    let criteria = args.criteria.to_criteria();
    // Compile now so a bad glob or date is rejected before it is stored
    criteria
        .compile()
        .with_context(|| format!("invalid criteria for pattern '{}'", args.name))?;

    let mut pattern = SearchPattern::new(&args.name, criteria);
    if let Some(description) = &args.description {
        pattern = pattern.with_description(description);
    }
    db.save(pattern)
        .with_context(|| format!("failed to save pattern '{}'", args.name))?;
    println!("Saved pattern {}", args.name);
    Ok(())
}

fn list(args: &PatternListArgs, db: &Database) -> Result<()> {
    let names = db.list().with_context(|| "failed to list patterns")?;
    match args.format {
        OutputFormat::Human => {
            if names.is_empty() {
                println!("No patterns saved.");
            }
            for name in &names {
                let pattern = db.load(name)?;
                match &pattern.description {
                    Some(desc) => println!("{:<24} {} (used {}x)", name, desc, pattern.usage_count),
                    None => println!("{:<24} (used {}x)", name, pattern.usage_count),
                }
            }
        }
        OutputFormat::Json => {
            let patterns = names
                .iter()
                .map(|name| db.load(name))
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&patterns)?;
        }
        OutputFormat::Paths => {
            for name in &names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn show(args: &PatternShowArgs, db: &Database) -> Result<()> {
    let pattern = db
        .load(&args.name)
        .with_context(|| format!("failed to load pattern '{}'", args.name))?;
    match args.format {
        OutputFormat::Json => print_json(&pattern)?,
        OutputFormat::Human | OutputFormat::Paths => {
            println!("name: {}", pattern.name);
            if let Some(desc) = &pattern.description {
                println!("description: {}", desc);
            }
            println!("criteria: {}", serde_json::to_string(&pattern.criteria)?);
            println!("used: {}", pattern.usage_count);
            println!("created: {}", pattern.created.format("%Y-%m-%d %H:%M:%S"));
            if let Some(last) = pattern.last_used {
                println!("last used: {}", last.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }
    Ok(())
}
