//! Concurrent execution of a control's validators.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::warn;

use crate::traits::Validator;
use crate::types::{ErrorSet, ValidatorFailure};

pub(crate) type SharedValidator<S> = Arc<dyn Validator<S>>;

/// Outcome of one validation run.
#[derive(Debug, Default)]
pub(crate) struct RunReport {
    pub(crate) errors: ErrorSet,
    pub(crate) failures: Vec<ValidatorFailure>,
}

impl RunReport {
    /// Errors to commit, and the first failure to report to the caller.
    pub(crate) fn into_parts(self) -> (ErrorSet, Option<ValidatorFailure>) {
        (self.errors, self.failures.into_iter().next())
    }
}

/// Runs every validator concurrently against `snapshot` and unions their
/// errors.
///
/// Each validator is its own task; dropping the returned future aborts the
/// ones still running. A validator returning `Err` or panicking contributes
/// no errors and is recorded as a failure.
pub(crate) async fn run_validators<S>(
    validators: &[SharedValidator<S>],
    snapshot: S,
    runtime: Option<&Handle>,
) -> RunReport
where
    S: Send + Sync + 'static,
{
    let mut report = RunReport::default();
    if validators.is_empty() {
        return report;
    }

    let snapshot = Arc::new(snapshot);
    let mut tasks = JoinSet::new();
    for validator in validators {
        let validator = Arc::clone(validator);
        let snapshot = Arc::clone(&snapshot);
        let task = async move { validator.validate(&snapshot).await };
        match runtime {
            Some(handle) => {
                tasks.spawn_on(task, handle);
            },
            None => {
                tasks.spawn(task);
            },
        }
    }

    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(ValidatorFailure::from) {
            Ok(Ok(errors)) => report.errors.extend(errors),
            Ok(Err(failure)) | Err(failure) => {
                warn!(message = failure.message(), "validator failed");
                report.failures.push(failure);
            },
        }
    }

    report
}
