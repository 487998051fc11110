//! Client pipeline for custodial reward settlement on the Stellar ledger.
//!
//! The pipeline makes exactly one attempt per decision: fetch the funding
//! account, build and simulate the contract invocation, assemble, sign with
//! the custodial key, broadcast, then poll for a terminal status under a
//! wall-clock deadline. A simulation error aborts before anything is signed
//! or broadcast. Submissions against the single funding account are
//! serialized through an in-process gate so concurrent settlements cannot
//! race on the account sequence number.

pub mod client;
pub mod config;
pub mod error;
pub mod rpc;
pub mod signer;
pub mod types;

pub use client::LedgerClient;
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use rpc::{HttpLedgerRpc, LedgerRpc};
pub use signer::CustodialSigner;
pub use types::{
    AccountEntry, ContractInvocation, InvokeArg, PreparedTransaction, SignedTransaction,
    SimulationResult, SubmitAck, TransactionReceipt, TxStatus, UnsignedTransaction,
};
