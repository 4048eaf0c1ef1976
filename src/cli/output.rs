//! Output format types and report rendering for CLI commands.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use crate::domain::{BatchReport, PreviewReport};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain vault paths, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Prints any serializable value as wrapped JSON.
pub fn print_json<T: Serialize>(data: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Output::new(data))?);
    Ok(())
}

/// A single note in listing output.
#[derive(Debug, Serialize)]
pub struct NoteListing {
    pub path: String,
    pub title: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A recorded operation in history output.
#[derive(Debug, Serialize)]
pub struct HistoryListing {
    pub id: String,
    pub timestamp: String,
    pub operation: String,
    pub affected: usize,
    pub undoable: bool,
}

/// Prints the outcome of a batch.
pub fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!("{}", report.summary());
            for failure in report.failed() {
                println!("  failed: {}: {}", failure.path, failure.reason);
            }
        }
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Paths => {
            for path in report.succeeded() {
                println!("{}", path);
            }
        }
    }
    Ok(())
}

/// Prints a dry-run forecast.
pub fn print_preview(preview: &PreviewReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!(
                "Dry run: {} on {} {} (risk: {})",
                preview.operation,
                preview.targets.len(),
                preview.operation.entities(),
                preview.risk
            );
            for change in &preview.changes {
                println!("  {}: {}", change.path, change.change);
            }
            for warning in &preview.warnings {
                println!("warning: {}", warning);
            }
        }
        OutputFormat::Json => print_json(preview)?,
        OutputFormat::Paths => {
            for target in &preview.targets {
                println!("{}", target);
            }
        }
    }
    Ok(())
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
