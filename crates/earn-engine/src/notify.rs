use anyhow::Result;
use async_trait::async_trait;
use earn_types::{RewardAmount, UserId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Fire-and-forget delivery of decision outcomes to workers. The engine
/// treats failures as log-only; delivery mechanics live outside the core.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn submission_approved(
        &self,
        user: &UserId,
        quest_title: &str,
        amount: RewardAmount,
    ) -> Result<()>;

    async fn submission_rejected(&self, user: &UserId, quest_title: &str, reason: &str)
        -> Result<()>;
}

/// Default sink: structured log lines, handed off to whatever ships logs.
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn submission_approved(
        &self,
        user: &UserId,
        quest_title: &str,
        amount: RewardAmount,
    ) -> Result<()> {
        info!(
            user = %user,
            quest = quest_title,
            amount = %amount,
            "🎉 Submission approved notification"
        );
        Ok(())
    }

    async fn submission_rejected(
        &self,
        user: &UserId,
        quest_title: &str,
        reason: &str,
    ) -> Result<()> {
        info!(
            user = %user,
            quest = quest_title,
            reason = reason,
            "📮 Submission rejected notification"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Approved {
        user: UserId,
        quest_title: String,
        amount: RewardAmount,
    },
    Rejected {
        user: UserId,
        quest_title: String,
        reason: String,
    },
}

/// Records events instead of delivering them; test double.
pub struct MemoryNotifier {
    events: Arc<RwLock<Vec<NotificationEvent>>>,
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotifier {
    async fn submission_approved(
        &self,
        user: &UserId,
        quest_title: &str,
        amount: RewardAmount,
    ) -> Result<()> {
        self.events.write().await.push(NotificationEvent::Approved {
            user: user.clone(),
            quest_title: quest_title.to_string(),
            amount,
        });
        Ok(())
    }

    async fn submission_rejected(
        &self,
        user: &UserId,
        quest_title: &str,
        reason: &str,
    ) -> Result<()> {
        self.events.write().await.push(NotificationEvent::Rejected {
            user: user.clone(),
            quest_title: quest_title.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }
}
