//! Batch coordinator: runs one mutation over many targets.

use crate::domain::{BatchReport, MutationOutcome, SelectionCriteria};
use crate::engine::history::{OperationHistory, capture};
use crate::engine::{EngineError, ExecOptions, Mutation, Selection, apply, discover};
use crate::store::NoteStore;
use tracing::{info, warn};

/// A caller-level bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRequest {
    pub selection: Selection,
    pub mutation: Mutation,
    pub confirm_destructive: bool,
}

impl BulkRequest {
    pub fn new(selection: Selection, mutation: Mutation) -> Self {
        Self {
            selection,
            mutation,
            confirm_destructive: false,
        }
    }

    pub fn confirmed(mut self, confirm: bool) -> Self {
        self.confirm_destructive = confirm;
        self
    }

    fn options(&self) -> ExecOptions {
        ExecOptions {
            confirm_destructive: self.confirm_destructive,
        }
    }
}

/// Applies `mutation` to every target in order.
///
/// Every target is attempted; a failure never stops the batch.
pub fn run_batch(
    store: &mut impl NoteStore,
    targets: &[String],
    mutation: &Mutation,
    options: ExecOptions,
) -> BatchReport {
    run(store, targets, mutation, options, false).0
}

/// Like [`run_batch`], also returning the snapshots needed to undo it.
pub fn run_batch_recorded(
    store: &mut impl NoteStore,
    targets: &[String],
    mutation: &Mutation,
    options: ExecOptions,
) -> (BatchReport, OperationHistory) {
    let (report, history) = run(store, targets, mutation, options, true);
    let history = history.unwrap_or_else(|| OperationHistory::new(report.operation()));
    (report, history)
}

fn run(
    store: &mut impl NoteStore,
    targets: &[String],
    mutation: &Mutation,
    options: ExecOptions,
    record: bool,
) -> (BatchReport, Option<OperationHistory>) {
    let kind = mutation.kind();
    info!(operation = %kind, targets = targets.len(), "starting batch");

    let mut history = record.then(|| OperationHistory::new(kind));
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets {
        let snapshot = match history {
            Some(_) => match capture(store, target, mutation) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!(path = %target, error = %err, "cannot snapshot for undo; skipped");
                    outcomes.push(MutationOutcome::failed(
                        target.as_str(),
                        err.kind(),
                        format!("cannot be undone, left untouched: {}", err),
                    ));
                    continue;
                }
            },
            None => None,
        };

        let outcome = apply(store, target, mutation, options);

        if let Some(history) = history.as_mut()
            && outcome.is_success()
        {
            if let Some(snapshot) = snapshot {
                history.snapshots.push(snapshot);
            }
            if let Some(identity) = outcome.identity() {
                history.affected_paths.push(identity.to_string());
            }
        }
        outcomes.push(outcome);
    }

    let report = BatchReport::from_outcomes(kind, outcomes);
    info!(operation = %kind, summary = %report.summary(), "finished batch");

    if let Some(history) = history.as_mut() {
        history.success = report.is_success();
    }
    (report, history)
}

/// Resolves the request's selection and runs the batch.
///
/// # Errors
///
/// Returns `EngineError` for missing parameters or invalid criteria, before
/// any store mutation.
pub fn run_bulk(store: &mut impl NoteStore, request: &BulkRequest) -> Result<BatchReport, EngineError> {
    run_bulk_inner(store, request, false).map(|(report, _)| report)
}

/// Like [`run_bulk`], also returning the undo journal entry.
///
/// # Errors
///
/// Same as [`run_bulk`].
pub fn run_bulk_recorded(
    store: &mut impl NoteStore,
    request: &BulkRequest,
) -> Result<(BatchReport, OperationHistory), EngineError> {
    let kind = request.mutation.kind();
    run_bulk_inner(store, request, true)
        .map(|(report, history)| (report, history.unwrap_or_else(|| OperationHistory::new(kind))))
}

fn run_bulk_inner(
    store: &mut impl NoteStore,
    request: &BulkRequest,
    record: bool,
) -> Result<(BatchReport, Option<OperationHistory>), EngineError> {
    request.mutation.validate()?;

    match &request.selection {
        Selection::Targets(targets) => Ok(run(
            store,
            targets,
            &request.mutation,
            request.options(),
            record,
        )),
        Selection::Criteria(criteria) => {
            find_and_run(store, criteria, &request.mutation, request.options(), record)
        }
    }
}

/// Two-phase run: discover, then apply to everything found.
///
/// With no matches the coordinator is not invoked and the report says so.
///
/// # Errors
///
/// Returns `EngineError` for missing parameters or invalid criteria.
pub fn find_and_apply(
    store: &mut impl NoteStore,
    criteria: &SelectionCriteria,
    mutation: &Mutation,
    options: ExecOptions,
) -> Result<BatchReport, EngineError> {
    mutation.validate()?;
    find_and_run(store, criteria, mutation, options, false).map(|(report, _)| report)
}

fn find_and_run(
    store: &mut impl NoteStore,
    criteria: &SelectionCriteria,
    mutation: &Mutation,
    options: ExecOptions,
    record: bool,
) -> Result<(BatchReport, Option<OperationHistory>), EngineError> {
    let targets = discover(store, criteria)?;
    if targets.is_empty() {
        info!(operation = %mutation.kind(), "no notes matched");
        return Ok((BatchReport::no_matches(mutation.kind()), None));
    }

    let matched = targets.len();
    let (report, history) = run(store, &targets, mutation, options, record);
    Ok((report.with_matched(matched), history))
}
