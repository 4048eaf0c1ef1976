//! Dry-run preview with a risk tier.

use crate::domain::{PreviewReport, ProjectedChange, RiskTier};
use crate::engine::executors::relocation_target;
use crate::engine::{EngineError, Mutation, Selection};
use crate::store::NoteStore;
use tracing::debug;

/// Forecasts what a bulk operation would do, without mutating anything.
///
/// # Errors
///
/// Returns `EngineError` for missing parameters or invalid criteria.
pub fn preview(
    store: &impl NoteStore,
    selection: &Selection,
    mutation: &Mutation,
) -> Result<PreviewReport, EngineError> {
    mutation.validate()?;
    let targets = selection.resolve(store)?;
    let kind = mutation.kind();
    let risk = RiskTier::for_count(targets.len());
    debug!(operation = %kind, targets = targets.len(), risk = %risk, "preview");

    let mut warnings = Vec::new();
    if targets.is_empty() {
        warnings.push("No notes found matching criteria".to_string());
    }
    if risk == RiskTier::High {
        warnings.push(format!(
            "Large batch: {} {} will be affected",
            targets.len(),
            kind.entities()
        ));
    }
    if kind.is_destructive() {
        warnings.push(format!(
            "{} is irreversible without undo; requires confirm_destructive",
            kind
        ));
    }

    let changes = targets
        .iter()
        .map(|target| {
            if let Some(missing) = missing_target(store, target, mutation) {
                warnings.push(missing);
            }
            ProjectedChange {
                path: target.clone(),
                change: describe(store, target, mutation),
            }
        })
        .collect();

    Ok(PreviewReport {
        operation: kind,
        targets,
        changes,
        warnings,
        risk,
    })
}

fn missing_target(store: &impl NoteStore, target: &str, mutation: &Mutation) -> Option<String> {
    let present = match mutation {
        Mutation::Create { .. } | Mutation::CreateFolder { .. } => return None,
        Mutation::DeleteFolder { .. } | Mutation::MoveFolder { .. } => store.folder_exists(target),
        _ => store.exists(target),
    };
    (!present).then(|| format!("Not found: {}", target))
}

/// One-line description of the change `mutation` makes to `target`.
fn describe(store: &impl NoteStore, target: &str, mutation: &Mutation) -> String {
    match mutation {
        Mutation::MergeTags { tags, extra } => {
            let mut change = format!("Add tags: {}", tags.join(", "));
            if !extra.is_empty() {
                let keys: Vec<&str> = extra.keys().collect();
                change.push_str(&format!("; set fields: {}", keys.join(", ")));
            }
            change
        }
        Mutation::OverwriteMetadata { fields } => {
            let keys: Vec<&str> = fields.keys().collect();
            format!("Set fields: {}", keys.join(", "))
        }
        Mutation::Relocate {
            destination_folder,
            ..
        }
        | Mutation::MoveFolder {
            destination: destination_folder,
        } => format!("Move to: {}", relocation_target(target, destination_folder)),
        Mutation::Create { overwrite, .. } => {
            if *overwrite && store.exists(target) {
                "Overwrite note".to_string()
            } else {
                "Create note".to_string()
            }
        }
        Mutation::Update { metadata, .. } => match metadata {
            Some(_) => "Replace body and metadata".to_string(),
            None => "Replace body".to_string(),
        },
        Mutation::Append { text } => format!("Append {} characters", text.chars().count()),
        Mutation::DeleteNote => "Delete note".to_string(),
        Mutation::DeleteFolder { recursive: true } => "Delete folder and contents".to_string(),
        Mutation::DeleteFolder { recursive: false } => "Delete empty folder".to_string(),
        Mutation::CreateFolder { .. } => "Create folder".to_string(),
    }
}
