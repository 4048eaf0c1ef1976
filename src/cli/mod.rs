//! CLI command definitions and handlers

pub mod config;
pub mod fields;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::SelectionCriteria;
use output::OutputFormat;

/// sheaf - bulk edits for a markdown note vault
#[derive(Parser, Debug)]
#[command(name = "sheaf", version, about, long_about = None)]
pub struct Cli {
    /// Vault directory (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List notes matching criteria
    Find(FindArgs),

    /// Add tags to notes
    Tag(TagArgs),

    /// Overwrite metadata fields on notes
    Set(SetArgs),

    /// Move notes into a folder
    Mv(MvArgs),

    /// Create a note
    New(NewArgs),

    /// Replace a note's body
    Write(WriteArgs),

    /// Append text to notes
    Append(AppendArgs),

    /// Delete notes
    Rm(RmArgs),

    /// Create folders
    Mkdir(MkdirArgs),

    /// Delete folders
    Rmdir(RmdirArgs),

    /// Move folders under another folder
    Mvdir(MvdirArgs),

    /// Revert the latest (or a given) recorded operation
    Undo(UndoArgs),

    /// Show recorded operations
    History(HistoryArgs),

    /// Manage saved search patterns
    #[command(subcommand)]
    Pattern(PatternCommand),

    /// Suggest a category for matching notes
    Classify(ClassifyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ===========================================
// Shared Arguments
// ===========================================

/// Criteria flags shared by every batch command.
#[derive(Args, Debug, Default, Clone)]
pub struct CriteriaArgs {
    /// Match notes carrying any of these tags (repeatable)
    #[arg(long = "any-tag", action = ArgAction::Append)]
    pub any_tag: Vec<String>,

    /// Match notes whose body contains this text
    #[arg(long)]
    pub contains: Option<String>,

    /// Match vault paths against a glob (`*` crosses folders)
    #[arg(long)]
    pub glob: Option<String>,

    /// Match notes created on or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_after: Option<String>,

    /// Match notes created on or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub created_before: Option<String>,

    /// Match notes with at least one tag
    #[arg(long, conflicts_with = "untagged")]
    pub tagged: bool,

    /// Match notes without tags
    #[arg(long)]
    pub untagged: bool,

    /// Match notes under this folder
    #[arg(long = "in", value_name = "FOLDER")]
    pub folder: Option<String>,

    /// Stop after this many matches
    #[arg(long)]
    pub limit: Option<usize>,

    /// Start from a saved pattern; explicit flags override its fields
    #[arg(long, value_name = "NAME")]
    pub pattern: Option<String>,

    /// Select every note in the vault
    #[arg(long)]
    pub all: bool,
}

impl CriteriaArgs {
    /// True if no selection flag was given.
    pub fn is_empty(&self) -> bool {
        !self.all && self.pattern.is_none() && self.to_criteria().is_unconstrained()
    }

    /// Builds criteria from the explicit flags alone.
    pub fn to_criteria(&self) -> SelectionCriteria {
        self.apply_to(SelectionCriteria::new())
    }

    /// Overrides fields of `base` with every flag that was given.
    pub fn apply_to(&self, mut base: SelectionCriteria) -> SelectionCriteria {
        if !self.any_tag.is_empty() {
            base.tags = Some(self.any_tag.clone());
        }
        if let Some(text) = &self.contains {
            base.content_contains = Some(text.clone());
        }
        if let Some(glob) = &self.glob {
            base.path_pattern = Some(glob.clone());
        }
        if let Some(after) = &self.created_after {
            base.created_after = Some(after.clone());
        }
        if let Some(before) = &self.created_before {
            base.created_before = Some(before.clone());
        }
        if self.tagged {
            base.has_tag = Some(true);
        } else if self.untagged {
            base.has_tag = Some(false);
        }
        if let Some(folder) = &self.folder {
            base.folder_path = Some(folder.clone());
        }
        if let Some(limit) = self.limit {
            base.limit = Some(limit);
        }
        base
    }
}

/// Targets and criteria for note batches.
#[derive(Args, Debug, Default, Clone)]
pub struct SelectArgs {
    /// Vault-relative note paths; when omitted, criteria select the notes
    pub targets: Vec<String>,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

/// Switches shared by every mutating batch command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Show what would change without touching the vault
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Confirm destructive or large batches
    #[arg(short, long)]
    pub yes: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

// ===========================================
// Note Commands
// ===========================================

/// Arguments for the `find` command
#[derive(Parser, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub criteria: CriteriaArgs,

    /// Order results by relevance to this query
    #[arg(long, value_name = "QUERY")]
    pub rank: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tag` command
#[derive(Parser, Debug)]
pub struct TagArgs {
    /// Tag to add (repeatable)
    #[arg(short, long = "tag", action = ArgAction::Append, required = true)]
    pub tags: Vec<String>,

    /// Extra field to write alongside the tags, as key=value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `set` command
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Field to overwrite, as key=value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", action = ArgAction::Append, required = true)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `mv` command
#[derive(Parser, Debug)]
pub struct MvArgs {
    /// Destination folder
    #[arg(long, value_name = "FOLDER")]
    pub to: String,

    /// Create the destination folder if missing
    #[arg(short = 'p', long)]
    pub create_folders: bool,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `new` command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Vault-relative path of the note
    pub path: String,

    /// Note body
    #[arg(short, long, default_value = "")]
    pub body: String,

    /// Tag for the note (repeatable)
    #[arg(short, long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,

    /// Header field, as key=value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub fields: Vec<String>,

    /// Replace an existing note
    #[arg(long)]
    pub overwrite: bool,

    /// Create missing parent folders
    #[arg(short = 'p', long)]
    pub create_folders: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `write` command
#[derive(Parser, Debug)]
pub struct WriteArgs {
    /// Vault-relative path of the note
    pub path: String,

    /// New body
    #[arg(short, long)]
    pub body: String,

    /// Replace the header with these fields, as key=value (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", action = ArgAction::Append)]
    pub fields: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `append` command
#[derive(Parser, Debug)]
pub struct AppendArgs {
    /// Text to append
    #[arg(long)]
    pub text: String,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug)]
pub struct RmArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

// ===========================================
// Folder Commands
// ===========================================

/// Arguments for the `mkdir` command
#[derive(Parser, Debug)]
pub struct MkdirArgs {
    /// Folders to create
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Succeed if a folder already exists
    #[arg(short = 'p', long)]
    pub exist_ok: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `rmdir` command
#[derive(Parser, Debug)]
pub struct RmdirArgs {
    /// Folders to delete
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Delete folder contents too
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `mvdir` command
#[derive(Parser, Debug)]
pub struct MvdirArgs {
    /// Folders to move
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Folder to move them under
    #[arg(long, value_name = "FOLDER")]
    pub to: String,

    #[command(flatten)]
    pub run: RunArgs,
}

// ===========================================
// Journal and Patterns
// ===========================================

/// Arguments for the `undo` command
#[derive(Parser, Debug)]
pub struct UndoArgs {
    /// Operation id (defaults to the latest undoable one)
    pub id: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `history` command
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Maximum number of entries
    #[arg(short = 'l', long, default_value_t = 20)]
    pub limit: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum PatternCommand {
    /// Save criteria under a name
    Save(PatternSaveArgs),

    /// List saved patterns
    #[command(name = "list")]
    List(PatternListArgs),

    /// Show a saved pattern
    Show(PatternShowArgs),

    /// Remove a saved pattern
    Rm(PatternRmArgs),
}

/// Arguments for `pattern save`
#[derive(Parser, Debug)]
pub struct PatternSaveArgs {
    /// Pattern name (no whitespace)
    pub name: String,

    /// Short description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub criteria: CriteriaArgs,
}

/// Arguments for `pattern list`
#[derive(Parser, Debug)]
pub struct PatternListArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for `pattern show`
#[derive(Parser, Debug)]
pub struct PatternShowArgs {
    pub name: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for `pattern rm`
#[derive(Parser, Debug)]
pub struct PatternRmArgs {
    pub name: String,
}

/// Arguments for the `classify` command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
