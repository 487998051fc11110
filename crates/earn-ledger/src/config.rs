use std::time::Duration;

/// Configuration for the ledger client pipeline.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node
    pub rpc_url: String,
    /// Reward contract the pipeline invokes
    pub contract_id: String,
    /// Network passphrase mixed into transaction signing payloads
    pub network_passphrase: String,
    /// Base fee per operation, in stroops
    pub base_fee: u32,
    /// Transaction validity window once broadcast
    pub tx_valid_for_secs: u64,
    /// Delay between confirmation polls
    pub poll_interval: Duration,
    /// Wall-clock deadline for reaching a terminal status
    pub confirm_timeout: Duration,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://soroban-testnet.stellar.org".to_string(),
            contract_id: String::new(),
            network_passphrase: "Test SDF Network ; September 2015".to_string(),
            base_fee: 100,
            tx_valid_for_secs: 30,
            poll_interval: Duration::from_secs(1),
            confirm_timeout: Duration::from_secs(60),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl LedgerConfig {
    /// Mainnet defaults; the contract id still has to be supplied.
    pub fn mainnet(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            network_passphrase: "Public Global Stellar Network ; September 2015".to_string(),
            ..Self::default()
        }
    }
}
