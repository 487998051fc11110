use thiserror::Error;

/// Ledger pipeline error types. Variants before broadcast carry no on-chain
/// side effects; `Submit`, `TransactionFailed` and `ConfirmationTimeout`
/// surface post-broadcast uncertainty the caller must compensate for.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// RPC transport or protocol failure
    #[error("Ledger RPC error: {0}")]
    Rpc(String),

    /// Funding account missing on the network
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Dry run reported an error; nothing was signed or broadcast
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Broadcast was rejected by the network
    #[error("Transaction submit failed for {hash}: {details}")]
    Submit { hash: String, details: String },

    /// Transaction reached a FAILED terminal status
    #[error("Transaction {hash} failed on-chain: {details}")]
    TransactionFailed { hash: String, details: String },

    /// No terminal status within the confirmation deadline
    #[error("Transaction {hash} not confirmed after {waited_ms}ms")]
    ConfirmationTimeout { hash: String, waited_ms: u64 },

    /// Custodial key material could not be loaded
    #[error("Signing error: {0}")]
    Signing(String),

    /// Client configuration rejected at construction
    #[error("Invalid ledger configuration: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// True when the error can only have occurred before any transaction
    /// was broadcast, so retrying is free of duplicate-payment risk.
    pub fn is_pre_broadcast(&self) -> bool {
        matches!(
            self,
            LedgerError::Rpc(_)
                | LedgerError::AccountNotFound(_)
                | LedgerError::Simulation(_)
                | LedgerError::Signing(_)
                | LedgerError::InvalidConfig(_)
        )
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
