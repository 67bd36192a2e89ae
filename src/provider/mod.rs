//! Ledger RPC abstraction.
//!
//! The node transport (HTTP, WebSocket, whatever) is owned by whoever
//! implements [`LedgerProvider`]; this crate consumes exactly three
//! operations: current head, log queries over a block range, and contract
//! calls with a gas budget. Provider failures are transient from the
//! watcher's point of view: a failed query costs one tick of progress and
//! nothing else.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

#[cfg(test)]
pub mod mock;

/// Errors surfaced by a ledger provider implementation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("ledger query failed: {0}")]
    Query(String),

    #[error("contract call failed: {0}")]
    Call(String),
}

/// A raw, undecoded log record as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    pub address: Address,
    /// Topic 0 is the event signature hash; the contracts this client
    /// watches declare no indexed parameters, so further topics are unused.
    pub topics: Vec<B256>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub log_index: u64,
}

/// A contract call: calldata, attached value, and a gas budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Vec<u8>,
    /// Native value sent with the call. Zero for everything except
    /// payable methods.
    pub value: U256,
    pub gas_limit: u64,
}

/// The ledger operations this client consumes.
#[async_trait]
pub trait LedgerProvider: Send + Sync {
    /// Current head block number.
    async fn get_block_number(&self) -> Result<u64, ProviderError>;

    /// Logs emitted by `address` in `from_block..=to_block`.
    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, ProviderError>;

    /// Execute a contract call and return its raw result. State-changing
    /// calls return an empty result.
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, ProviderError>;
}
