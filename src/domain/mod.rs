//! Core types: Note, Metadata, SelectionCriteria, reports

pub mod criteria;
pub mod metadata;
mod note;
pub mod report;
pub mod vault_path;

pub use criteria::{BoundSide, CompiledCriteria, CriteriaError, SelectionCriteria, parse_date_bound};
pub use metadata::{CREATED_KEY, MetaValue, Metadata, TAGS_KEY, TITLE_KEY};
pub use note::Note;
pub use report::{
    BatchReport, Failure, FailureKind, MutationOutcome, OperationKind, PreviewReport,
    ProjectedChange, RiskTier,
};
