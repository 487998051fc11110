use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use earn_types::{Quest, QuestId, Submission, SubmissionId, SubmissionStatus, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Field changes applied by a conditional update. `None` leaves a field
/// untouched; `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default)]
pub struct SubmissionUpdate {
    pub status: Option<SubmissionStatus>,
    pub approved_by: Option<Option<UserId>>,
    pub approved_at: Option<Option<DateTime<Utc>>>,
    pub rejected_by: Option<Option<UserId>>,
    pub rejected_at: Option<Option<DateTime<Utc>>>,
    pub rejection_reason: Option<Option<String>>,
    pub verifier_notes: Option<Option<String>>,
}

impl SubmissionUpdate {
    /// Stamp an approval decision.
    pub fn approval(actor: UserId, notes: Option<String>) -> Self {
        Self {
            status: Some(SubmissionStatus::Approved),
            approved_by: Some(Some(actor)),
            approved_at: Some(Some(Utc::now())),
            verifier_notes: notes.map(Some),
            ..Self::default()
        }
    }

    /// Stamp a rejection decision.
    pub fn rejection(actor: UserId, reason: String, notes: Option<String>) -> Self {
        Self {
            status: Some(SubmissionStatus::Rejected),
            rejected_by: Some(Some(actor)),
            rejected_at: Some(Some(Utc::now())),
            rejection_reason: Some(Some(reason)),
            verifier_notes: notes.map(Some),
            ..Self::default()
        }
    }

    /// Inverse of `approval`: restore the observed pre-decision status and
    /// clear the approver stamp. Used only by the compensation path.
    pub fn revert_approval(to: SubmissionStatus) -> Self {
        Self {
            status: Some(to),
            approved_by: Some(None),
            approved_at: Some(None),
            ..Self::default()
        }
    }

    pub fn apply(&self, submission: &mut Submission) {
        if let Some(status) = self.status {
            submission.status = status;
        }
        if let Some(v) = &self.approved_by {
            submission.approved_by = v.clone();
        }
        if let Some(v) = &self.approved_at {
            submission.approved_at = *v;
        }
        if let Some(v) = &self.rejected_by {
            submission.rejected_by = v.clone();
        }
        if let Some(v) = &self.rejected_at {
            submission.rejected_at = *v;
        }
        if let Some(v) = &self.rejection_reason {
            submission.rejection_reason = v.clone();
        }
        if let Some(v) = &self.verifier_notes {
            submission.verifier_notes = v.clone();
        }
        submission.updated_at = Utc::now();
    }
}

/// Persistence surface for submissions. `update_if` is the optimistic
/// concurrency primitive: the update applies only while the row still holds
/// the expected status, and the affected-row count is the success signal.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get(&self, id: &SubmissionId) -> Result<Option<Submission>>;

    async fn insert(&self, submission: Submission) -> Result<()>;

    async fn update_if(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        changes: SubmissionUpdate,
    ) -> Result<u64>;

    async fn list_by_quest(&self, quest_id: &QuestId) -> Result<Vec<Submission>>;
}

/// Read-only quest lookup used for authorization and reward parameters.
#[async_trait]
pub trait QuestDirectory: Send + Sync {
    async fn get_quest(&self, id: &QuestId) -> Result<Option<Quest>>;
}

pub struct MemorySubmissionStore {
    rows: Arc<RwLock<HashMap<SubmissionId, Submission>>>,
}

impl Default for MemorySubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn get(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn insert(&self, submission: Submission) -> Result<()> {
        let mut rows = self.rows.write().await;
        rows.insert(submission.id.clone(), submission);
        Ok(())
    }

    async fn update_if(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        changes: SubmissionUpdate,
    ) -> Result<u64> {
        // Check and write under one lock: linearizable per row, exactly
        // like a conditional UPDATE's affected-row count.
        let mut rows = self.rows.write().await;
        match rows.get_mut(id) {
            Some(row) if row.status == expected => {
                changes.apply(row);
                debug!(
                    submission_id = %id,
                    from = %expected,
                    to = %row.status,
                    storage_type = "memory",
                    "💾 Conditional update applied"
                );
                Ok(1)
            }
            Some(row) => {
                debug!(
                    submission_id = %id,
                    expected = %expected,
                    actual = %row.status,
                    storage_type = "memory",
                    "Conditional update lost the race"
                );
                Ok(0)
            }
            None => Ok(0),
        }
    }

    async fn list_by_quest(&self, quest_id: &QuestId) -> Result<Vec<Submission>> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Submission> = rows
            .values()
            .filter(|s| &s.quest_id == quest_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}

pub struct MemoryQuestDirectory {
    quests: Arc<RwLock<HashMap<QuestId, Quest>>>,
}

impl Default for MemoryQuestDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQuestDirectory {
    pub fn new() -> Self {
        Self {
            quests: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, quest: Quest) {
        let mut quests = self.quests.write().await;
        quests.insert(quest.id.clone(), quest);
    }
}

#[async_trait]
impl QuestDirectory for MemoryQuestDirectory {
    async fn get_quest(&self, id: &QuestId) -> Result<Option<Quest>> {
        let quests = self.quests.read().await;
        Ok(quests.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_types::AccountAddress;
    use serde_json::json;

    fn submission(id: &str) -> Submission {
        Submission::new(
            SubmissionId::from(id),
            QuestId::from("q-1"),
            UserId::from("worker"),
            AccountAddress::from_bytes([1u8; 32]),
            json!({"url": "https://example.com/proof"}),
        )
    }

    #[tokio::test]
    async fn test_update_if_applies_on_match() {
        let store = MemorySubmissionStore::new();
        store.insert(submission("s-1")).await.unwrap();

        let affected = store
            .update_if(
                &SubmissionId::from("s-1"),
                SubmissionStatus::Pending,
                SubmissionUpdate::approval(UserId::from("v-1"), None),
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let row = store.get(&SubmissionId::from("s-1")).await.unwrap().unwrap();
        assert_eq!(row.status, SubmissionStatus::Approved);
        assert_eq!(row.approved_by, Some(UserId::from("v-1")));
        assert!(row.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_update_if_zero_rows_on_stale_status() {
        let store = MemorySubmissionStore::new();
        store.insert(submission("s-1")).await.unwrap();

        let affected = store
            .update_if(
                &SubmissionId::from("s-1"),
                SubmissionStatus::UnderReview,
                SubmissionUpdate::approval(UserId::from("v-1"), None),
            )
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let row = store.get(&SubmissionId::from("s-1")).await.unwrap().unwrap();
        assert_eq!(row.status, SubmissionStatus::Pending);
        assert!(row.approved_by.is_none());
    }

    #[tokio::test]
    async fn test_update_if_missing_row() {
        let store = MemorySubmissionStore::new();
        let affected = store
            .update_if(
                &SubmissionId::from("absent"),
                SubmissionStatus::Pending,
                SubmissionUpdate::default(),
            )
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_revert_approval_clears_stamp() {
        let store = MemorySubmissionStore::new();
        store.insert(submission("s-1")).await.unwrap();

        store
            .update_if(
                &SubmissionId::from("s-1"),
                SubmissionStatus::Pending,
                SubmissionUpdate::approval(UserId::from("v-1"), Some("ok".to_string())),
            )
            .await
            .unwrap();
        store
            .update_if(
                &SubmissionId::from("s-1"),
                SubmissionStatus::Approved,
                SubmissionUpdate::revert_approval(SubmissionStatus::Pending),
            )
            .await
            .unwrap();

        let row = store.get(&SubmissionId::from("s-1")).await.unwrap().unwrap();
        assert_eq!(row.status, SubmissionStatus::Pending);
        assert!(row.approved_by.is_none());
        assert!(row.approved_at.is_none());
        // Notes from the attempted approval are kept for audit.
        assert_eq!(row.verifier_notes.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_list_by_quest_newest_first() {
        let store = MemorySubmissionStore::new();
        let mut first = submission("s-1");
        first.created_at = Utc::now() - chrono::Duration::seconds(60);
        let second = submission("s-2");
        let mut other_quest = submission("s-3");
        other_quest.quest_id = QuestId::from("q-2");

        store.insert(first).await.unwrap();
        store.insert(second).await.unwrap();
        store.insert(other_quest).await.unwrap();

        let listed = store.list_by_quest(&QuestId::from("q-1")).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, SubmissionId::from("s-2"));
        assert_eq!(listed[1].id, SubmissionId::from("s-1"));
    }
}
