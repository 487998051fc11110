use crate::authorization::authorize_decision;
use crate::error::{DecisionError, Result};
use crate::notify::NotificationSink;
use crate::settlement::RewardSettlement;
use crate::store::{QuestDirectory, SubmissionStore, SubmissionUpdate};
use earn_types::{ActorRole, Quest, Submission, SubmissionId, SubmissionStatus, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// Review validation bounds, mirroring the upstream column constraints.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub min_reason_len: usize,
    pub max_reason_len: usize,
    pub max_notes_len: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_reason_len: 10,
            max_reason_len: 500,
            max_notes_len: 1000,
        }
    }
}

/// A verifier's decision on a submission.
#[derive(Debug, Clone)]
pub enum DecisionAction {
    Approve { notes: Option<String> },
    Reject { reason: String, notes: Option<String> },
}

/// Orchestrates one decision: authorization, conditional status transition,
/// on-chain settlement for approvals, compensation on settlement failure,
/// and best-effort worker notification.
pub struct DecisionEngine {
    submissions: Arc<dyn SubmissionStore>,
    quests: Arc<dyn QuestDirectory>,
    settlement: Arc<dyn RewardSettlement>,
    notifier: Arc<dyn NotificationSink>,
    config: ReviewConfig,
}

impl DecisionEngine {
    pub fn new(
        submissions: Arc<dyn SubmissionStore>,
        quests: Arc<dyn QuestDirectory>,
        settlement: Arc<dyn RewardSettlement>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            submissions,
            quests,
            settlement,
            notifier,
            config: ReviewConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReviewConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply a decision. Safe to retry from scratch on any ledger error:
    /// compensation has restored the submission to a decidable state.
    pub async fn decide(
        &self,
        id: &SubmissionId,
        action: DecisionAction,
        actor: &UserId,
        role: ActorRole,
    ) -> Result<Submission> {
        match action {
            DecisionAction::Approve { notes } => self.approve(id, notes, actor, role).await,
            DecisionAction::Reject { reason, notes } => {
                self.reject(id, reason, notes, actor, role).await
            }
        }
    }

    async fn approve(
        &self,
        id: &SubmissionId,
        notes: Option<String>,
        actor: &UserId,
        role: ActorRole,
    ) -> Result<Submission> {
        let (submission, quest) = self.load(id).await?;
        self.ensure_authorized(&quest, actor, role)?;
        self.validate_notes(&notes)?;

        let observed = submission.status;
        Self::check_transition(observed, SubmissionStatus::Approved)?;

        let affected = self
            .submissions
            .update_if(
                id,
                observed,
                SubmissionUpdate::approval(actor.clone(), notes),
            )
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))?;

        if affected == 0 {
            info!(submission_id = %id, observed = %observed, "Approval lost the decision race");
            return Err(DecisionError::Conflict);
        }

        info!(
            submission_id = %id,
            quest_id = %quest.id,
            approved_by = %actor,
            "✅ Submission approved, settling reward"
        );

        if let Err(ledger_err) = self
            .settlement
            .settle_reward(
                &quest.contract_task_id,
                submission.worker_address,
                quest.reward,
            )
            .await
        {
            self.compensate_approval(id, observed, &ledger_err).await;
            return Err(DecisionError::Ledger(ledger_err));
        }

        let updated = self.reload(id).await?;

        if let Err(e) = self
            .notifier
            .submission_approved(&updated.worker, &quest.title, quest.reward)
            .await
        {
            warn!(submission_id = %id, error = %e, "Approval notification failed");
        }

        Ok(updated)
    }

    async fn reject(
        &self,
        id: &SubmissionId,
        reason: String,
        notes: Option<String>,
        actor: &UserId,
        role: ActorRole,
    ) -> Result<Submission> {
        let (submission, quest) = self.load(id).await?;
        self.ensure_authorized(&quest, actor, role)?;

        let reason = reason.trim().to_string();
        if reason.len() < self.config.min_reason_len {
            return Err(DecisionError::Validation(format!(
                "rejection reason must be at least {} characters",
                self.config.min_reason_len
            )));
        }
        if reason.len() > self.config.max_reason_len {
            return Err(DecisionError::Validation(format!(
                "rejection reason cannot exceed {} characters",
                self.config.max_reason_len
            )));
        }
        self.validate_notes(&notes)?;

        let observed = submission.status;
        Self::check_transition(observed, SubmissionStatus::Rejected)?;

        let affected = self
            .submissions
            .update_if(
                id,
                observed,
                SubmissionUpdate::rejection(actor.clone(), reason.clone(), notes),
            )
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))?;

        if affected == 0 {
            info!(submission_id = %id, observed = %observed, "Rejection lost the decision race");
            return Err(DecisionError::Conflict);
        }

        info!(
            submission_id = %id,
            quest_id = %quest.id,
            rejected_by = %actor,
            "🛑 Submission rejected"
        );

        let updated = self.reload(id).await?;

        if let Err(e) = self
            .notifier
            .submission_rejected(&updated.worker, &quest.title, &reason)
            .await
        {
            warn!(submission_id = %id, error = %e, "Rejection notification failed");
        }

        Ok(updated)
    }

    pub async fn get_submission(&self, id: &SubmissionId) -> Result<Submission> {
        self.reload(id).await
    }

    pub async fn list_quest_submissions(
        &self,
        quest_id: &earn_types::QuestId,
    ) -> Result<Vec<Submission>> {
        self.submissions
            .list_by_quest(quest_id)
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))
    }

    /// Second half of the saga: the settlement failed after the transition
    /// applied, so revert it and clear the approver stamp. The submission
    /// is decidable again afterwards.
    async fn compensate_approval(
        &self,
        id: &SubmissionId,
        observed: SubmissionStatus,
        cause: &earn_ledger::LedgerError,
    ) {
        warn!(
            submission_id = %id,
            restore_to = %observed,
            error = %cause,
            "⏪ Settlement failed, reverting approval"
        );

        match self
            .submissions
            .update_if(
                id,
                SubmissionStatus::Approved,
                SubmissionUpdate::revert_approval(observed),
            )
            .await
        {
            Ok(1) => {}
            Ok(_) => warn!(
                submission_id = %id,
                "Compensation found an unexpected status; leaving row as-is"
            ),
            Err(e) => warn!(
                submission_id = %id,
                error = %e,
                "Compensation update failed; submission left approved without settlement"
            ),
        }
    }

    async fn load(&self, id: &SubmissionId) -> Result<(Submission, Quest)> {
        let submission = self
            .submissions
            .get(id)
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))?
            .ok_or_else(|| DecisionError::SubmissionNotFound(id.clone()))?;

        let quest = self
            .quests
            .get_quest(&submission.quest_id)
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))?
            .ok_or_else(|| DecisionError::QuestNotFound(submission.quest_id.clone()))?;

        Ok((submission, quest))
    }

    async fn reload(&self, id: &SubmissionId) -> Result<Submission> {
        self.submissions
            .get(id)
            .await
            .map_err(|e| DecisionError::Store(e.to_string()))?
            .ok_or_else(|| DecisionError::SubmissionNotFound(id.clone()))
    }

    fn ensure_authorized(&self, quest: &Quest, actor: &UserId, role: ActorRole) -> Result<()> {
        if !authorize_decision(quest, actor, role) {
            return Err(DecisionError::Forbidden(format!(
                "{} may not verify quest {}",
                actor, quest.id
            )));
        }
        Ok(())
    }

    fn check_transition(from: SubmissionStatus, to: SubmissionStatus) -> Result<()> {
        if !from.can_transition_to(to) {
            return Err(DecisionError::InvalidTransition { from, to });
        }
        Ok(())
    }

    fn validate_notes(&self, notes: &Option<String>) -> Result<()> {
        if let Some(notes) = notes {
            if notes.len() > self.config.max_notes_len {
                return Err(DecisionError::Validation(format!(
                    "verifier notes cannot exceed {} characters",
                    self.config.max_notes_len
                )));
            }
        }
        Ok(())
    }
}
