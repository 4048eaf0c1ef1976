//! Criteria predicate over a single loaded note.

use crate::domain::{CompiledCriteria, Note, vault_path};

/// Returns true if `note` satisfies every present criterion.
///
/// Absent criteria are vacuously true. A note without a parseable
/// `created` field fails only the date criteria.
pub fn matches(note: &Note, criteria: &CompiledCriteria) -> bool {
    let tags = note.tags();

    if let Some(wanted) = &criteria.tags
        && !wanted.iter().any(|w| tags.contains(&w.as_str()))
    {
        return false;
    }

    if let Some(text) = &criteria.content_contains
        && !note.body().contains(text.as_str())
    {
        return false;
    }

    if let Some(glob) = &criteria.glob
        && !glob.is_match(note.path())
    {
        return false;
    }

    if criteria.created_after.is_some() || criteria.created_before.is_some() {
        let Some(created) = note.created() else {
            return false;
        };
        if criteria.created_after.is_some_and(|after| created < after) {
            return false;
        }
        if criteria.created_before.is_some_and(|before| created > before) {
            return false;
        }
    }

    if let Some(has_tag) = criteria.has_tag
        && tags.is_empty() == has_tag
    {
        return false;
    }

    if let Some(folder) = &criteria.folder_path
        && !vault_path::is_within(note.path(), folder)
    {
        return false;
    }

    true
}
