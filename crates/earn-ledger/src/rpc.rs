use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::types::{
    AccountEntry, SignedTransaction, SimulationResult, SubmitAck, TransactionReceipt,
    UnsignedTransaction,
};
use async_trait::async_trait;
use earn_types::AccountAddress;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Server error code for a missing ledger entry.
const CODE_NOT_FOUND: i64 = -32001;

/// Network RPC surface the pipeline consumes. Implemented over JSON-RPC in
/// production and by in-memory mocks in tests.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn get_account(&self, address: AccountAddress) -> Result<AccountEntry>;

    /// Dry-run the transaction. A simulation-level error is returned as
    /// `LedgerError::Simulation`.
    async fn simulate_transaction(&self, tx: &UnsignedTransaction) -> Result<SimulationResult>;

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<SubmitAck>;

    async fn get_transaction(&self, hash: &str) -> Result<TransactionReceipt>;
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct SimulateResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    min_resource_fee: Option<String>,
    #[serde(default)]
    footprint: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 transport over HTTPS.
pub struct HttpLedgerRpc {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpLedgerRpc {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| LedgerError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<P: Serialize, T: DeserializeOwned>(&self, method: &str, params: P) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(method = method, url = %self.url, "📡 Ledger RPC call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Rpc(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Rpc(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Rpc(format!("{} response decode failed: {}", method, e)))?;

        if let Some(err) = body.error {
            if err.code == CODE_NOT_FOUND {
                return Err(LedgerError::AccountNotFound(err.message));
            }
            return Err(LedgerError::Rpc(format!(
                "{} error {}: {}",
                method, err.code, err.message
            )));
        }

        body.result
            .ok_or_else(|| LedgerError::Rpc(format!("{} returned an empty result", method)))
    }
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
    async fn get_account(&self, address: AccountAddress) -> Result<AccountEntry> {
        self.call("getAccount", json!({ "account": address.to_hex() }))
            .await
            .map_err(|e| match e {
                LedgerError::AccountNotFound(_) => LedgerError::AccountNotFound(address.to_hex()),
                other => other,
            })
    }

    async fn simulate_transaction(&self, tx: &UnsignedTransaction) -> Result<SimulationResult> {
        let response: SimulateResponse = self
            .call("simulateTransaction", json!({ "transaction": tx }))
            .await?;

        if let Some(error) = response.error {
            return Err(LedgerError::Simulation(error));
        }

        let min_resource_fee = match response.min_resource_fee {
            Some(fee) => fee
                .parse::<u64>()
                .map_err(|e| LedgerError::Rpc(format!("bad minResourceFee: {}", e)))?,
            None => 0,
        };

        Ok(SimulationResult {
            min_resource_fee,
            footprint: response.footprint,
            result: response.result,
        })
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<SubmitAck> {
        let ack: SubmitAck = self
            .call("sendTransaction", json!({ "transaction": tx }))
            .await?;

        if ack.status.as_deref() == Some("ERROR") {
            return Err(LedgerError::Submit {
                hash: ack.hash,
                details: "network rejected the transaction".to_string(),
            });
        }

        Ok(ack)
    }

    async fn get_transaction(&self, hash: &str) -> Result<TransactionReceipt> {
        self.call("getTransaction", json!({ "hash": hash })).await
    }
}
