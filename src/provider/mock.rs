//! Scriptable in-memory provider backing the crate's tests.

use super::{CallRequest, LedgerProvider, ProviderError, RawLog};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A fake ledger: a settable head, a log list, and queued call results.
#[derive(Default)]
pub struct MockProvider {
    head: AtomicU64,
    logs: Mutex<Vec<RawLog>>,
    call_results: Mutex<VecDeque<Vec<u8>>>,
    calls: Mutex<Vec<CallRequest>>,
    fail_queries: AtomicBool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub fn push_log(&self, log: RawLog) {
        self.logs.lock().unwrap().push(log);
    }

    /// Queue the result the next `call` returns.
    pub fn push_call_result(&self, result: Vec<u8>) {
        self.call_results.lock().unwrap().push_back(result);
    }

    /// Requests observed so far, oldest first.
    pub fn recorded_calls(&self) -> Vec<CallRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Make `get_block_number` and `get_logs` fail until turned off again.
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerProvider for MockProvider {
    async fn get_block_number(&self) -> Result<u64, ProviderError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ProviderError::Query("mock outage".to_string()));
        }
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, ProviderError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ProviderError::Query("mock outage".to_string()));
        }
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                log.address == address
                    && log.block_number >= from_block
                    && log.block_number <= to_block
            })
            .cloned()
            .collect())
    }

    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, ProviderError> {
        self.calls.lock().unwrap().push(request);
        Ok(self.call_results.lock().unwrap().pop_front().unwrap_or_default())
    }
}
