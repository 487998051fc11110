//! Decision engine for quest submissions.
//!
//! Composes authorization, the submission status state machine and the
//! ledger settlement pipeline into one `decide` operation. Approval is a
//! two-step saga: the status transition applies first through an atomic
//! conditional update, the on-chain settlement runs second, and a failed
//! settlement is compensated by reverting the transition. The relational
//! store and the ledger can therefore never disagree about whether a
//! reward was paid.

pub mod authorization;
pub mod engine;
pub mod error;
pub mod notify;
pub mod settlement;
pub mod store;

pub use engine::{DecisionAction, DecisionEngine, ReviewConfig};
pub use error::{DecisionError, Result};
pub use notify::{MemoryNotifier, NotificationEvent, NotificationSink, TracingNotifier};
pub use settlement::RewardSettlement;
pub use store::{
    MemoryQuestDirectory, MemorySubmissionStore, QuestDirectory, SubmissionStore, SubmissionUpdate,
};
