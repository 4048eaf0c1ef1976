//! Per-item outcomes and aggregate reports for bulk operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ===========================================
// Operation Kind
// ===========================================

/// The mutation a batch applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    TagMerge,
    MetadataOverwrite,
    Relocate,
    Create,
    Update,
    Append,
    DeleteNote,
    DeleteFolder,
    CreateFolder,
    MoveFolder,
    Undo,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::TagMerge => "tag_merge",
            OperationKind::MetadataOverwrite => "metadata_overwrite",
            OperationKind::Relocate => "relocate",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Append => "append",
            OperationKind::DeleteNote => "delete_note",
            OperationKind::DeleteFolder => "delete_folder",
            OperationKind::CreateFolder => "create_folder",
            OperationKind::MoveFolder => "move_folder",
            OperationKind::Undo => "undo",
        }
    }

    /// Past-tense verb used in report summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            OperationKind::TagMerge => "Tagged",
            OperationKind::MetadataOverwrite | OperationKind::Update => "Updated",
            OperationKind::Relocate | OperationKind::MoveFolder => "Moved",
            OperationKind::Create | OperationKind::CreateFolder => "Created",
            OperationKind::Append => "Appended to",
            OperationKind::DeleteNote | OperationKind::DeleteFolder => "Deleted",
            OperationKind::Undo => "Restored",
        }
    }

    /// Plural noun for the items this operation acts on.
    pub fn entities(&self) -> &'static str {
        match self {
            OperationKind::DeleteFolder
            | OperationKind::CreateFolder
            | OperationKind::MoveFolder => "folders",
            OperationKind::Undo => "items",
            _ => "notes",
        }
    }

    /// Returns true for operations that remove content irreversibly.
    pub fn is_destructive(&self) -> bool {
        matches!(self, OperationKind::DeleteNote | OperationKind::DeleteFolder)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown operation name.
#[derive(Debug, Clone)]
pub struct ParseOperationKindError(String);

impl fmt::Display for ParseOperationKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation: {}", self.0)
    }
}

impl std::error::Error for ParseOperationKindError {}

impl FromStr for OperationKind {
    type Err = ParseOperationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "tag_merge" => OperationKind::TagMerge,
            "metadata_overwrite" => OperationKind::MetadataOverwrite,
            "relocate" => OperationKind::Relocate,
            "create" => OperationKind::Create,
            "update" => OperationKind::Update,
            "append" => OperationKind::Append,
            "delete_note" => OperationKind::DeleteNote,
            "delete_folder" => OperationKind::DeleteFolder,
            "create_folder" => OperationKind::CreateFolder,
            "move_folder" => OperationKind::MoveFolder,
            "undo" => OperationKind::Undo,
            other => return Err(ParseOperationKindError(other.to_string())),
        };
        Ok(kind)
    }
}

// ===========================================
// Mutation Outcome
// ===========================================

/// Classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    AlreadyExists,
    NotEmpty,
    PermissionGate,
    Validation,
    PermissionDenied,
    Io,
}

/// Result of applying one mutation to one target.
///
/// A failed outcome always carries a reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome {
    target: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl MutationOutcome {
    /// A successful outcome whose target is now known as `identity`.
    pub fn succeeded(target: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: true,
            identity: Some(identity.into()),
            failure: None,
            reason: None,
        }
    }

    /// A failed outcome.
    pub fn failed(target: impl Into<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            success: false,
            identity: None,
            failure: Some(kind),
            reason: Some(reason.into()),
        }
    }

    /// The target as supplied to the executor.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The target's identity after the mutation (destination for moves).
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

// ===========================================
// Batch Report
// ===========================================

/// A target that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub path: String,
    pub reason: String,
}

/// Aggregate result of one batch run.
///
/// Built once from the per-item outcomes and immutable afterwards.
/// `partial_success` is derived: present (and `true`) only when the batch
/// has both successes and failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    operation: OperationKind,
    total: usize,
    affected_count: usize,
    succeeded: Vec<String>,
    failed: Vec<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<usize>,
    summary: String,
}

impl BatchReport {
    /// Aggregates outcomes in attempt order.
    pub fn from_outcomes(operation: OperationKind, outcomes: Vec<MutationOutcome>) -> Self {
        let total = outcomes.len();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for outcome in outcomes {
            if outcome.success {
                succeeded.push(outcome.identity.unwrap_or(outcome.target));
            } else {
                failed.push(Failure {
                    path: outcome.target,
                    reason: outcome
                        .reason
                        .unwrap_or_else(|| "unknown failure".to_string()),
                });
            }
        }

        let summary = format!(
            "{} {}/{} {}",
            operation.verb(),
            succeeded.len(),
            total,
            operation.entities()
        );

        Self {
            operation,
            total,
            affected_count: succeeded.len(),
            partial_success: (!succeeded.is_empty() && !failed.is_empty()).then_some(true),
            succeeded,
            failed,
            matched: None,
            summary,
        }
    }

    /// Report for a two-phase run whose discovery found nothing.
    pub fn no_matches(operation: OperationKind) -> Self {
        Self {
            operation,
            total: 0,
            affected_count: 0,
            succeeded: Vec::new(),
            failed: Vec::new(),
            partial_success: None,
            matched: Some(0),
            summary: "No notes found matching criteria".to_string(),
        }
    }

    /// Records how many targets discovery produced for this batch.
    ///
    /// The summary keeps its fixed template; the count is exposed through
    /// [`BatchReport::matched`].
    pub(crate) fn with_matched(mut self, matched: usize) -> Self {
        self.matched = Some(matched);
        self
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Number of targets attempted.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn affected_count(&self) -> usize {
        self.affected_count
    }

    /// Identities of succeeded targets, in attempt order.
    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[Failure] {
        &self.failed
    }

    pub fn partial_success(&self) -> Option<bool> {
        self.partial_success
    }

    /// Number of targets discovery matched, for criteria-driven runs.
    pub fn matched(&self) -> Option<usize> {
        self.matched
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// True if anything succeeded, or there was nothing to do.
    pub fn is_success(&self) -> bool {
        self.total == 0 || !self.succeeded.is_empty()
    }
}

// ===========================================
// Preview Report
// ===========================================

/// Coarse size classification of a pending batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Upper bound (inclusive) of the low tier.
    pub const LOW_MAX: usize = 10;
    /// Upper bound (inclusive) of the medium tier.
    pub const MEDIUM_MAX: usize = 50;

    /// Classifies a batch by the number of targets it would touch.
    pub fn for_count(count: usize) -> Self {
        if count > Self::MEDIUM_MAX {
            RiskTier::High
        } else if count > Self::LOW_MAX {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskTier::Low),
            "medium" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            other => Err(format!("invalid risk tier '{}': expected low, medium or high", other)),
        }
    }
}

/// What a pending operation would do to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedChange {
    pub path: String,
    pub change: String,
}

/// Read-only forecast of a bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewReport {
    pub operation: OperationKind,
    pub targets: Vec<String>,
    pub changes: Vec<ProjectedChange>,
    pub warnings: Vec<String>,
    pub risk: RiskTier,
}
