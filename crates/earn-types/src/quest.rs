use crate::amount::RewardAmount;
use crate::id::{QuestId, UserId};
use serde::{Deserialize, Serialize};

/// Quest metadata as the decision engine reads it. Read-only to the core;
/// quest CRUD lives upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    /// Task identifier registered with the reward contract.
    pub contract_task_id: String,
    pub reward: RewardAmount,
    pub reward_asset: String,
    pub creator: UserId,
    /// Accounts allowed to decide submissions for this quest, in addition
    /// to the creator and platform admins.
    pub verifiers: Vec<UserId>,
}

impl Quest {
    pub fn has_verifier(&self, user: &UserId) -> bool {
        self.verifiers.contains(user)
    }
}
