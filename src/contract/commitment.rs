use crate::coder::{AbiValue, CoderError, ParamKind};
use crate::contract::{ContractError, DEFAULT_GAS_LIMIT, b256_field, calldata, u64_field};
use crate::db::KeyValueStore;
use crate::events::{
    CursorStore, EventLog, EventLogDecoder, EventSignature, EventWatcher, ListenerId,
    WatcherConfig,
};
use crate::provider::{CallRequest, LedgerProvider};
use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use tracing::warn;

/// A plasma block root accepted by the commitment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSubmitted {
    pub block_number: u64,
    pub root: B256,
}

impl BlockSubmitted {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let [block_number, root] = event.values.as_slice() else {
            return Err(CoderError::Mismatch(format!(
                "BlockSubmitted carries {} values, expected 2",
                event.values.len()
            )));
        };
        Ok(Self {
            block_number: u64_field(block_number, "submitted block number")?,
            root: b256_field(root, "submitted root")?,
        })
    }
}

/// Binding for the commitment contract, where the aggregator publishes
/// merkle roots of plasma blocks.
pub struct CommitmentContract {
    provider: Arc<dyn LedgerProvider>,
    address: Address,
    watcher: EventWatcher,
}

impl CommitmentContract {
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        address: Address,
        event_db: Arc<dyn KeyValueStore>,
        config: WatcherConfig,
    ) -> Self {
        let watcher = EventWatcher::new(
            provider.clone(),
            EventLogDecoder::new(vec![EventSignature::new(
                "BlockSubmitted",
                vec![ParamKind::Uint(64), ParamKind::FixedBytes(32)],
            )]),
            CursorStore::new(event_db),
            address,
            config,
        );
        Self {
            provider,
            address,
            watcher,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The polling watcher behind the typed subscriptions. Callers drive
    /// its lifecycle (`start`/`cancel`) directly.
    pub fn watcher(&self) -> &EventWatcher {
        &self.watcher
    }

    /// Publish a block root.
    pub async fn submit(&self, block_number: u64, root: B256) -> Result<(), ContractError> {
        let data = calldata(
            "submit_root(uint64,bytes32)",
            &[
                (ParamKind::Uint(64), AbiValue::Uint(U256::from(block_number))),
                (
                    ParamKind::FixedBytes(32),
                    AbiValue::FixedBytes(root.to_vec()),
                ),
            ],
        )?;
        self.provider
            .call(CallRequest {
                to: self.address,
                data,
                value: U256::ZERO,
                gas_limit: DEFAULT_GAS_LIMIT,
            })
            .await?;
        Ok(())
    }

    pub fn subscribe_block_submitted(
        &self,
        handler: impl Fn(BlockSubmitted) + Send + Sync + 'static,
    ) -> ListenerId {
        self.watcher.subscribe("BlockSubmitted", move |event| {
            match BlockSubmitted::from_event(event) {
                Ok(submitted) => handler(submitted),
                Err(err) => warn!("malformed BlockSubmitted payload: {err}"),
            }
        })
    }

    pub fn unsubscribe_block_submitted(&self, id: ListenerId) {
        self.watcher.unsubscribe("BlockSubmitted", id);
    }
}
