use earn_types::AccountAddress;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Funding account state as fetched from the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub account_id: AccountAddress,
    pub sequence: u64,
}

/// Argument passed to a reward contract function.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InvokeArg {
    Str(String),
    Address(AccountAddress),
    U128(u128),
}

/// A single contract call, the only operation the pipeline builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInvocation {
    pub contract_id: String,
    pub function: String,
    pub args: Vec<InvokeArg>,
}

/// Transaction before simulation: sequence is already consumed, fees are
/// the base fee only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub source: AccountAddress,
    pub sequence: u64,
    pub fee: u32,
    pub invocation: ContractInvocation,
    pub valid_for_secs: u64,
}

impl UnsignedTransaction {
    pub fn new(
        account: &AccountEntry,
        fee: u32,
        invocation: ContractInvocation,
        valid_for_secs: u64,
    ) -> Self {
        Self {
            source: account.account_id,
            // The network expects the account's next sequence number.
            sequence: account.sequence + 1,
            fee,
            invocation,
            valid_for_secs,
        }
    }

    /// Fold the simulation's resource footprint into a signable transaction.
    pub fn assemble(self, sim: &SimulationResult) -> PreparedTransaction {
        PreparedTransaction {
            fee: self.fee.saturating_add(sim.min_resource_fee as u32),
            source: self.source,
            sequence: self.sequence,
            invocation: self.invocation,
            valid_for_secs: self.valid_for_secs,
            resource_footprint: sim.footprint.clone(),
        }
    }
}

/// Dry-run outcome. A simulation-level failure never reaches this type; it
/// surfaces as `LedgerError::Simulation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub min_resource_fee: u64,
    #[serde(default)]
    pub footprint: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// Assembled transaction awaiting the custodial signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedTransaction {
    pub source: AccountAddress,
    pub sequence: u64,
    pub fee: u32,
    pub invocation: ContractInvocation,
    pub valid_for_secs: u64,
    pub resource_footprint: Option<serde_json::Value>,
}

impl PreparedTransaction {
    /// Signing payload: SHA-256 over the network id and the canonical
    /// transaction encoding. Doubles as the transaction hash.
    pub fn signing_payload(&self, network_passphrase: &str) -> [u8; 32] {
        let network_id = Sha256::digest(network_passphrase.as_bytes());
        let body = serde_json::to_vec(self).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(network_id);
        hasher.update(&body);
        hasher.finalize().into()
    }
}

/// Fully signed transaction ready for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: PreparedTransaction,
    pub signature: Vec<u8>,
    /// Hex of the signing payload hash; the network identifies the
    /// transaction by the same digest.
    pub hash: String,
}

/// Acknowledgement of a broadcast, before any confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAck {
    pub hash: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
    NotFound,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Success | TxStatus::Failed)
    }
}

/// Polled transaction state; ephemeral, logged but never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub hash: String,
    pub status: TxStatus,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}
