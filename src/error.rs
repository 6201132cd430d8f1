use thiserror::Error;

use crate::repo::RepositoryError;

/// Failure taxonomy of the workflow core.
///
/// `Validation` is the only locally recoverable case: coordinators log it and
/// stop without persisting or dispatching anything. Everything else aborts
/// the run and propagates to the triggering layer, which owns redelivery.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no workflow step registered under name '{0}'")]
    UnknownStep(String),

    #[error("step '{step}' violated its parameter contract: {detail}")]
    ContractViolation { step: String, detail: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invariant violated: {0}")]
    Invariant(String),
}
