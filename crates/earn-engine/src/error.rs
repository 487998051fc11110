use earn_ledger::LedgerError;
use earn_types::{QuestId, SubmissionId, SubmissionStatus};
use thiserror::Error;

/// Decision error taxonomy. Ordering matters to callers: `Forbidden` and
/// `Validation` occur before any store mutation, `Conflict` after a
/// conditional update that never applied, and `Ledger` after an applied
/// transition was compensated back: the decision briefly existed but did
/// not take, and the submission is decidable again.
#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("Submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    #[error("Quest not found: {0}")]
    QuestNotFound(QuestId),

    #[error("Not authorized to decide submissions for this quest: {0}")]
    Forbidden(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("Submission status changed concurrently; refresh and retry")]
    Conflict,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Defensive catch-all for the persistence boundary; non-retryable.
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for decision operations
pub type Result<T> = std::result::Result<T, DecisionError>;
