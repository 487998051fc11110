use async_trait::async_trait;
use earn_ledger::{LedgerClient, LedgerError, TransactionReceipt};
use earn_types::{AccountAddress, RewardAmount};

/// Seam between the decision engine and the ledger pipeline, injected at
/// startup so tests can substitute a scripted settlement.
#[async_trait]
pub trait RewardSettlement: Send + Sync {
    async fn settle_reward(
        &self,
        task_id: &str,
        recipient: AccountAddress,
        amount: RewardAmount,
    ) -> Result<TransactionReceipt, LedgerError>;
}

#[async_trait]
impl RewardSettlement for LedgerClient {
    async fn settle_reward(
        &self,
        task_id: &str,
        recipient: AccountAddress,
        amount: RewardAmount,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.approve_reward(task_id, recipient, amount).await
    }
}
