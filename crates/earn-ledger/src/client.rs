use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;
use crate::signer::CustodialSigner;
use crate::types::{
    ContractInvocation, InvokeArg, SignedTransaction, SimulationResult, SubmitAck,
    TransactionReceipt, TxStatus, UnsignedTransaction,
};
use earn_types::{AccountAddress, RewardAmount};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Submit-and-confirm client for the reward contract.
///
/// Every settlement makes exactly one attempt: a failure after broadcast is
/// reported, never retried here, because re-broadcasting blindly risks a
/// duplicate payment. The fetch-sequence-to-broadcast window is serialized
/// through `submit_gate` so concurrent settlements against the single
/// funding account cannot observe the same sequence number.
pub struct LedgerClient {
    rpc: Arc<dyn LedgerRpc>,
    signer: CustodialSigner,
    config: LedgerConfig,
    submit_gate: Mutex<()>,
}

impl std::fmt::Debug for LedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LedgerClient {
    pub fn new(rpc: Arc<dyn LedgerRpc>, signer: CustodialSigner, config: LedgerConfig) -> Result<Self> {
        if config.contract_id.is_empty() {
            return Err(LedgerError::InvalidConfig(
                "contract_id is not configured".to_string(),
            ));
        }
        if config.rpc_url.is_empty() {
            return Err(LedgerError::InvalidConfig(
                "rpc_url is not configured".to_string(),
            ));
        }

        info!(
            contract_id = %config.contract_id,
            funding_account = %signer.public_key(),
            "🔗 Ledger client initialized"
        );

        Ok(Self {
            rpc,
            signer,
            config,
            submit_gate: Mutex::new(()),
        })
    }

    /// Invoke the contract's reward-approval entry and wait for a terminal
    /// status under the configured deadline.
    pub async fn approve_reward(
        &self,
        task_id: &str,
        recipient: AccountAddress,
        amount: RewardAmount,
    ) -> Result<TransactionReceipt> {
        info!(
            task_id = task_id,
            recipient = %recipient,
            amount = %amount,
            "💰 Settling reward approval on-chain"
        );

        let invocation = ContractInvocation {
            contract_id: self.config.contract_id.clone(),
            function: "approve".to_string(),
            args: vec![
                InvokeArg::Str(task_id.to_string()),
                InvokeArg::Address(recipient),
                InvokeArg::U128(amount.to_base_units()),
            ],
        };

        let ack = self.broadcast(invocation).await?;
        let receipt = self.wait_for_confirmation(&ack.hash).await?;

        info!(
            task_id = task_id,
            tx_hash = %receipt.hash,
            ledger = receipt.ledger,
            "✅ Reward approval confirmed"
        );
        Ok(receipt)
    }

    /// Register a quest task with the reward contract.
    pub async fn register_task(
        &self,
        task_id: &str,
        reward_asset: &str,
        amount: RewardAmount,
        verifier: AccountAddress,
    ) -> Result<TransactionReceipt> {
        info!(task_id = task_id, "📝 Registering task on-chain");

        let invocation = ContractInvocation {
            contract_id: self.config.contract_id.clone(),
            function: "register_task".to_string(),
            args: vec![
                InvokeArg::Str(task_id.to_string()),
                InvokeArg::Str(reward_asset.to_string()),
                InvokeArg::U128(amount.to_base_units()),
                InvokeArg::Address(verifier),
            ],
        };

        let ack = self.broadcast(invocation).await?;
        let receipt = self.wait_for_confirmation(&ack.hash).await?;

        info!(task_id = task_id, tx_hash = %receipt.hash, "✅ Task registered");
        Ok(receipt)
    }

    /// Read a user's stats from the contract. Simulation only: never
    /// signed, never broadcast, no fee.
    pub async fn fetch_user_stats(&self, address: AccountAddress) -> Result<SimulationResult> {
        let account = self.rpc.get_account(self.signer.public_key()).await?;
        let invocation = ContractInvocation {
            contract_id: self.config.contract_id.clone(),
            function: "get_user_stats".to_string(),
            args: vec![InvokeArg::Address(address)],
        };
        let tx = UnsignedTransaction::new(
            &account,
            self.config.base_fee,
            invocation,
            self.config.tx_valid_for_secs,
        );
        self.rpc.simulate_transaction(&tx).await
    }

    /// Steps 1-6 of the pipeline: fetch sequence, build, simulate,
    /// assemble, sign, broadcast. Holds the submit gate throughout so the
    /// observed sequence number stays valid until broadcast.
    async fn broadcast(&self, invocation: ContractInvocation) -> Result<SubmitAck> {
        let _gate = self.submit_gate.lock().await;

        let account = self.rpc.get_account(self.signer.public_key()).await?;
        debug!(sequence = account.sequence, "Funding account fetched");

        let unsigned = UnsignedTransaction::new(
            &account,
            self.config.base_fee,
            invocation,
            self.config.tx_valid_for_secs,
        );

        // Aborts before anything is signed: no fee, no side effects.
        let sim = self.rpc.simulate_transaction(&unsigned).await?;
        debug!(min_resource_fee = sim.min_resource_fee, "Simulation passed");

        let prepared = unsigned.assemble(&sim);
        let payload = prepared.signing_payload(&self.config.network_passphrase);
        let signed = SignedTransaction {
            signature: self.signer.sign(&payload),
            hash: hex::encode(payload),
            tx: prepared,
        };

        // A transport failure here leaves the broadcast in doubt; report it
        // as a submit failure so callers treat it as post-broadcast.
        let ack = match self.rpc.send_transaction(&signed).await {
            Ok(ack) => ack,
            Err(LedgerError::Rpc(details)) => {
                return Err(LedgerError::Submit {
                    hash: signed.hash,
                    details,
                })
            }
            Err(other) => return Err(other),
        };

        info!(tx_hash = %ack.hash, "📡 Transaction submitted");
        Ok(ack)
    }

    /// Step 7: poll at `poll_interval` until a terminal status or the
    /// `confirm_timeout` wall-clock deadline.
    async fn wait_for_confirmation(&self, hash: &str) -> Result<TransactionReceipt> {
        let started = Instant::now();

        loop {
            if started.elapsed() >= self.config.confirm_timeout {
                let waited_ms = started.elapsed().as_millis() as u64;
                warn!(tx_hash = hash, waited_ms = waited_ms, "⏰ Confirmation deadline passed");
                return Err(LedgerError::ConfirmationTimeout {
                    hash: hash.to_string(),
                    waited_ms,
                });
            }

            match self.rpc.get_transaction(hash).await {
                Ok(receipt) => match receipt.status {
                    TxStatus::Success => return Ok(receipt),
                    TxStatus::Failed => {
                        return Err(LedgerError::TransactionFailed {
                            hash: hash.to_string(),
                            details: receipt
                                .result
                                .map(|r| r.to_string())
                                .unwrap_or_else(|| "no result returned".to_string()),
                        })
                    }
                    TxStatus::Pending | TxStatus::NotFound => {}
                },
                // Not indexed yet or transient transport noise; keep polling
                // until the deadline decides.
                Err(e) => debug!(tx_hash = hash, error = %e, "Poll attempt failed"),
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    pub fn funding_account(&self) -> AccountAddress {
        self.signer.public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::RwLock;

    struct MockRpc {
        sequence: AtomicU64,
        sim_error: Option<String>,
        final_status: RwLock<TxStatus>,
        /// Polls to answer Pending before the terminal status.
        pending_polls: AtomicUsize,
        calls: RwLock<Vec<&'static str>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Default for MockRpc {
        fn default() -> Self {
            Self {
                sequence: AtomicU64::new(0),
                sim_error: None,
                final_status: RwLock::new(TxStatus::Pending),
                pending_polls: AtomicUsize::new(0),
                calls: RwLock::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl MockRpc {
        fn succeeding() -> Self {
            Self {
                final_status: RwLock::new(TxStatus::Success),
                ..Default::default()
            }
        }

        async fn calls(&self) -> Vec<&'static str> {
            self.calls.read().await.clone()
        }
    }

    #[async_trait]
    impl LedgerRpc for MockRpc {
        async fn get_account(&self, address: AccountAddress) -> Result<AccountEntry> {
            self.calls.write().await.push("get_account");
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            // Widen the race window between sequence fetch and broadcast.
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(AccountEntry {
                account_id: address,
                sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            })
        }

        async fn simulate_transaction(
            &self,
            _tx: &UnsignedTransaction,
        ) -> Result<SimulationResult> {
            self.calls.write().await.push("simulate");
            if let Some(error) = &self.sim_error {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                return Err(LedgerError::Simulation(error.clone()));
            }
            Ok(SimulationResult {
                min_resource_fee: 50,
                footprint: None,
                result: None,
            })
        }

        async fn send_transaction(&self, tx: &SignedTransaction) -> Result<SubmitAck> {
            self.calls.write().await.push("send");
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(SubmitAck {
                hash: tx.hash.clone(),
                status: None,
            })
        }

        async fn get_transaction(&self, hash: &str) -> Result<TransactionReceipt> {
            self.calls.write().await.push("get_transaction");
            if self.pending_polls.load(Ordering::SeqCst) > 0 {
                self.pending_polls.fetch_sub(1, Ordering::SeqCst);
                return Ok(TransactionReceipt {
                    hash: hash.to_string(),
                    status: TxStatus::Pending,
                    ledger: None,
                    result: None,
                });
            }
            Ok(TransactionReceipt {
                hash: hash.to_string(),
                status: *self.final_status.read().await,
                ledger: Some(1234),
                result: None,
            })
        }
    }

    fn fast_config() -> LedgerConfig {
        LedgerConfig {
            contract_id: "CCREWARD".to_string(),
            poll_interval: Duration::from_millis(10),
            confirm_timeout: Duration::from_millis(200),
            ..LedgerConfig::default()
        }
    }

    fn client_with(rpc: Arc<MockRpc>) -> LedgerClient {
        LedgerClient::new(rpc, CustodialSigner::generate(), fast_config()).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_step_order() {
        let rpc = Arc::new(MockRpc::succeeding());
        let client = client_with(rpc.clone());

        let receipt = client
            .approve_reward(
                "task-1",
                AccountAddress::from_bytes([9u8; 32]),
                RewardAmount::from_tokens(100.0),
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, TxStatus::Success);
        assert_eq!(receipt.ledger, Some(1234));
        assert_eq!(
            rpc.calls().await,
            vec!["get_account", "simulate", "send", "get_transaction"]
        );
    }

    #[tokio::test]
    async fn test_simulation_error_aborts_before_broadcast() {
        let rpc = Arc::new(MockRpc {
            sim_error: Some("host function trapped".to_string()),
            ..MockRpc::succeeding()
        });
        let client = client_with(rpc.clone());

        let err = client
            .approve_reward(
                "task-1",
                AccountAddress::from_bytes([9u8; 32]),
                RewardAmount::from_tokens(1.0),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Simulation(_)));
        assert!(err.is_pre_broadcast());
        // Nothing after the simulate step ran.
        assert_eq!(rpc.calls().await, vec!["get_account", "simulate"]);
    }

    #[tokio::test]
    async fn test_failed_transaction_reported() {
        let rpc = Arc::new(MockRpc {
            final_status: RwLock::new(TxStatus::Failed),
            ..Default::default()
        });
        let client = client_with(rpc);

        let err = client
            .approve_reward(
                "task-1",
                AccountAddress::from_bytes([9u8; 32]),
                RewardAmount::from_tokens(1.0),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::TransactionFailed { .. }));
        assert!(!err.is_pre_broadcast());
    }

    #[tokio::test]
    async fn test_confirmation_deadline() {
        let rpc = Arc::new(MockRpc {
            // More pending answers than the deadline allows polls.
            pending_polls: AtomicUsize::new(1000),
            ..MockRpc::succeeding()
        });
        let client = client_with(rpc);

        let started = Instant::now();
        let err = client
            .approve_reward(
                "task-1",
                AccountAddress::from_bytes([9u8; 32]),
                RewardAmount::from_tokens(1.0),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::ConfirmationTimeout { .. }));
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_pending_then_success_polls_through() {
        let rpc = Arc::new(MockRpc {
            pending_polls: AtomicUsize::new(3),
            ..MockRpc::succeeding()
        });
        let client = client_with(rpc.clone());

        let receipt = client
            .approve_reward(
                "task-1",
                AccountAddress::from_bytes([9u8; 32]),
                RewardAmount::from_tokens(1.0),
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, TxStatus::Success);
        let polls = rpc
            .calls()
            .await
            .iter()
            .filter(|c| **c == "get_transaction")
            .count();
        assert_eq!(polls, 4);
    }

    #[tokio::test]
    async fn test_submit_gate_serializes_sequence_acquisition() {
        let rpc = Arc::new(MockRpc::succeeding());
        let client = Arc::new(client_with(rpc.clone()));

        let mut handles = Vec::new();
        for i in 0..4 {
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                client
                    .approve_reward(
                        &format!("task-{}", i),
                        AccountAddress::from_bytes([i as u8; 32]),
                        RewardAmount::from_tokens(1.0),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // The gate admits at most one settlement between sequence fetch
        // and broadcast.
        assert_eq!(rpc.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(rpc.sequence.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_rejects_missing_contract_id() {
        let rpc = Arc::new(MockRpc::succeeding());
        let err = LedgerClient::new(
            rpc,
            CustodialSigner::generate(),
            LedgerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_fetch_user_stats_never_broadcasts() {
        let rpc = Arc::new(MockRpc::succeeding());
        let client = client_with(rpc.clone());

        client
            .fetch_user_stats(AccountAddress::from_bytes([9u8; 32]))
            .await
            .unwrap();

        assert_eq!(rpc.calls().await, vec!["get_account", "simulate"]);
    }
}
