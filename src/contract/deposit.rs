use crate::coder::{AbiValue, CoderError, ParamKind};
use crate::contract::{ContractError, DEFAULT_GAS_LIMIT, b256_field, calldata};
use crate::db::KeyValueStore;
use crate::events::{
    CursorStore, EventLog, EventLogDecoder, EventSignature, EventWatcher, ListenerId,
    WatcherConfig,
};
use crate::provider::{CallRequest, LedgerProvider};
use crate::types::{Property, Range};
use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use tracing::warn;

/// A checkpoint the deposit contract has finalized: the claimed range and
/// the state property that now owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointFinalized {
    pub checkpoint_id: B256,
    pub range: Range,
    pub state: Property,
}

impl CheckpointFinalized {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let [checkpoint_id, checkpoint] = event.values.as_slice() else {
            return Err(CoderError::Mismatch(format!(
                "CheckpointFinalized carries {} values, expected 2",
                event.values.len()
            )));
        };
        let checkpoint_id = b256_field(checkpoint_id, "checkpoint id")?;
        let parts = checkpoint.as_tuple().ok_or_else(|| {
            CoderError::Mismatch(format!("expected checkpoint tuple, got {checkpoint:?}"))
        })?;
        let [range, state] = parts else {
            return Err(CoderError::Mismatch(format!(
                "checkpoint tuple has {} members, expected 2",
                parts.len()
            )));
        };
        Ok(Self {
            checkpoint_id,
            range: Range::from_abi(range)?,
            state: Property::from_abi(state)?,
        })
    }
}

/// An exit the deposit contract has paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitFinalized {
    pub exit_id: B256,
}

impl ExitFinalized {
    fn from_event(event: &EventLog) -> Result<Self, CoderError> {
        let [exit_id] = event.values.as_slice() else {
            return Err(CoderError::Mismatch(format!(
                "ExitFinalized carries {} values, expected 1",
                event.values.len()
            )));
        };
        Ok(Self {
            exit_id: b256_field(exit_id, "exit id")?,
        })
    }
}

fn checkpoint_kind() -> ParamKind {
    ParamKind::tuple(vec![
        ParamKind::tuple(vec![ParamKind::Uint(256), ParamKind::Uint(256)]),
        Property::param_kind(),
    ])
}

fn checkpoint_finalized_signature() -> EventSignature {
    EventSignature::new(
        "CheckpointFinalized",
        vec![ParamKind::FixedBytes(32), checkpoint_kind()],
    )
}

fn exit_finalized_signature() -> EventSignature {
    EventSignature::new("ExitFinalized", vec![ParamKind::FixedBytes(32)])
}

/// Binding for a deposit contract, the custody point where tokens enter
/// and leave the plasma chain.
pub struct DepositContract {
    provider: Arc<dyn LedgerProvider>,
    address: Address,
    watcher: EventWatcher,
}

impl DepositContract {
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        address: Address,
        event_db: Arc<dyn KeyValueStore>,
        config: WatcherConfig,
    ) -> Self {
        let watcher = EventWatcher::new(
            provider.clone(),
            EventLogDecoder::new(vec![
                checkpoint_finalized_signature(),
                exit_finalized_signature(),
            ]),
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

    pub fn watcher(&self) -> &EventWatcher {
        &self.watcher
    }

    /// Lock `amount` under `initial_state`.
    pub async fn deposit(
        &self,
        amount: U256,
        initial_state: &Property,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "deposit(uint256,(address,bytes[]))",
            &[
                (ParamKind::Uint(256), AbiValue::Uint(amount)),
                (Property::param_kind(), initial_state.to_abi_value()),
            ],
        )?;
        self.send(data).await
    }

    pub async fn finalize_checkpoint(&self, checkpoint: &Property) -> Result<(), ContractError> {
        let data = calldata(
            "finalizeCheckpoint((address,bytes[]))",
            &[(Property::param_kind(), checkpoint.to_abi_value())],
        )?;
        self.send(data).await
    }

    pub async fn finalize_exit(
        &self,
        exit: &Property,
        deposited_range_id: U256,
    ) -> Result<(), ContractError> {
        let data = calldata(
            "finalizeExit((address,bytes[]),uint256)",
            &[
                (Property::param_kind(), exit.to_abi_value()),
                (ParamKind::Uint(256), AbiValue::Uint(deposited_range_id)),
            ],
        )?;
        self.send(data).await
    }

    pub fn subscribe_checkpoint_finalized(
        &self,
        handler: impl Fn(CheckpointFinalized) + Send + Sync + 'static,
    ) -> ListenerId {
        self.watcher.subscribe("CheckpointFinalized", move |event| {
            match CheckpointFinalized::from_event(event) {
                Ok(finalized) => handler(finalized),
                Err(err) => warn!("malformed CheckpointFinalized payload: {err}"),
            }
        })
    }

    pub fn unsubscribe_checkpoint_finalized(&self, id: ListenerId) {
        self.watcher.unsubscribe("CheckpointFinalized", id);
    }

    pub fn subscribe_exit_finalized(
        &self,
        handler: impl Fn(ExitFinalized) + Send + Sync + 'static,
    ) -> ListenerId {
        self.watcher.subscribe("ExitFinalized", move |event| {
            match ExitFinalized::from_event(event) {
                Ok(finalized) => handler(finalized),
                Err(err) => warn!("malformed ExitFinalized payload: {err}"),
            }
        })
    }

    pub fn unsubscribe_exit_finalized(&self, id: ListenerId) {
        self.watcher.unsubscribe("ExitFinalized", id);
    }

    async fn send(&self, data: Vec<u8>) -> Result<(), ContractError> {
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
}
