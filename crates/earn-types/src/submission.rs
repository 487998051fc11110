use crate::address::AccountAddress;
use crate::id::{QuestId, SubmissionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a quest submission. Stored verbatim by the upstream
/// relational store, hence the SCREAMING_SNAKE_CASE wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Paid,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 5] = [
        SubmissionStatus::Pending,
        SubmissionStatus::UnderReview,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
        SubmissionStatus::Paid,
    ];

    /// Decision edges permitted from each state. Approved and Paid are
    /// terminal: once a reward settled (or was paid out), no decision may
    /// move the submission again. Rejected allows resubmission.
    pub fn allowed_transitions(&self) -> &'static [SubmissionStatus] {
        match self {
            SubmissionStatus::Pending => &[
                SubmissionStatus::UnderReview,
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected,
            ],
            SubmissionStatus::UnderReview => &[
                SubmissionStatus::Pending,
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected,
            ],
            SubmissionStatus::Approved => &[],
            SubmissionStatus::Rejected => &[SubmissionStatus::Pending],
            SubmissionStatus::Paid => &[],
        }
    }

    pub fn can_transition_to(&self, to: SubmissionStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::UnderReview => "UNDER_REVIEW",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
            SubmissionStatus::Paid => "PAID",
        };
        write!(f, "{}", s)
    }
}

/// Role of the already-authenticated actor issuing a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Worker,
    Verifier,
    Admin,
}

/// A worker's proof-of-completion for a quest, owned by the decision engine
/// once created upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub quest_id: QuestId,
    pub worker: UserId,
    /// Ledger address rewards are paid to.
    pub worker_address: AccountAddress,
    /// Opaque structured proof payload, validated upstream.
    pub proof: serde_json::Value,
    pub status: SubmissionStatus,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<UserId>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub verifier_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        id: SubmissionId,
        quest_id: QuestId,
        worker: UserId,
        worker_address: AccountAddress,
        proof: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            quest_id,
            worker,
            worker_address,
            proof,
            status: SubmissionStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            verifier_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use SubmissionStatus::*;

        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Paid));

        assert!(UnderReview.can_transition_to(Pending));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));

        assert!(Rejected.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Approved));

        for to in SubmissionStatus::ALL {
            assert!(!Approved.can_transition_to(to));
            assert!(!Paid.can_transition_to(to));
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for status in SubmissionStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(SubmissionStatus::Approved.is_terminal());
        assert!(SubmissionStatus::Paid.is_terminal());
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(!SubmissionStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&SubmissionStatus::UnderReview).unwrap();
        assert_eq!(json, "\"UNDER_REVIEW\"");
        let back: SubmissionStatus = serde_json::from_str("\"PAID\"").unwrap();
        assert_eq!(back, SubmissionStatus::Paid);
    }
}
