//! Discovery: turns selection criteria into an ordered target list.

use crate::domain::{CompiledCriteria, SelectionCriteria};
use crate::engine::{EngineError, matches};
use crate::store::NoteStore;
use tracing::{debug, warn};

/// How a caller names the targets of a bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Explicit vault-relative paths, used in the given order.
    Targets(Vec<String>),
    /// Paths found by discovery.
    Criteria(SelectionCriteria),
}

impl Selection {
    /// Resolves the selection to concrete targets.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Criteria` if criteria fail to compile and
    /// `EngineError::Store` if the store cannot be listed.
    pub fn resolve(&self, store: &impl NoteStore) -> Result<Vec<String>, EngineError> {
        match self {
            Selection::Targets(paths) => Ok(paths.clone()),
            Selection::Criteria(criteria) => discover(store, criteria),
        }
    }
}

/// Finds notes matching `criteria`, in store listing order.
///
/// The store is listed once and each note read once. Scanning stops as soon
/// as the limit is reached. A note that cannot be read is skipped.
///
/// # Errors
///
/// Returns `EngineError::Criteria` for invalid criteria and
/// `EngineError::Store` if the listing itself fails.
pub fn discover(
    store: &impl NoteStore,
    criteria: &SelectionCriteria,
) -> Result<Vec<String>, EngineError> {
    let compiled = criteria.compile()?;
    discover_compiled(store, &compiled)
}

/// Like [`discover`] for criteria that are already compiled.
pub fn discover_compiled(
    store: &impl NoteStore,
    criteria: &CompiledCriteria,
) -> Result<Vec<String>, EngineError> {
    let mut found = Vec::new();
    if criteria.limit() == Some(0) {
        return Ok(found);
    }

    for path in store.list()? {
        let note = match store.read(&path) {
            Ok(note) => note,
            Err(err) => {
                warn!(path = %path, error = %err, "skipping unreadable note");
                continue;
            }
        };

        if matches(&note, criteria) {
            debug!(path = %path, "matched");
            found.push(path);
            if criteria.limit().is_some_and(|limit| found.len() >= limit) {
                break;
            }
        }
    }

    Ok(found)
}
