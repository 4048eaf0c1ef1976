//! Bulk mutation engine: discovery, executors, batches, preview and undo.

mod batch;
mod discovery;
pub mod executors;
pub mod history;
mod matcher;
mod mutation;
mod preview;

pub use batch::{
    BulkRequest, find_and_apply, run_batch, run_batch_recorded, run_bulk, run_bulk_recorded,
};
pub use discovery::{Selection, discover, discover_compiled};
pub use executors::{ExecError, apply};
pub use history::{NoteState, OperationHistory, Snapshot, undo, undo_pending};
pub use matcher::matches;
pub use mutation::{ExecOptions, Mutation};
pub use preview::preview;

use crate::domain::CriteriaError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that reject a request as a whole.
///
/// Per-item failures never surface here; they are recorded in the
/// batch report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("failed to list notes: {0}")]
    Store(#[from] StoreError),
}
