use crate::coder::{AbiValue, CoderError, ParamKind};
use crate::db::KvError;
use crate::provider::ProviderError;
use alloy_primitives::{B256, keccak256};

/// A declared event shape: name plus ordered parameter types.
///
/// The table of signatures a decoder is built from must exactly match the
/// on-chain contract's emitted events; a wrong parameter list changes the
/// topic hash and the event silently stops matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
    pub name: String,
    pub inputs: Vec<ParamKind>,
}

impl EventSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<ParamKind>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    /// Canonical signature string, e.g. `BlockSubmitted(uint64,bytes32)`.
    pub fn canonical(&self) -> String {
        let inputs = self
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({inputs})", self.name)
    }

    /// Topic 0 of every log this event emits.
    pub fn topic_hash(&self) -> B256 {
        keccak256(self.canonical().as_bytes())
    }
}

/// A decoded, named event.
///
/// `(block_number, log_index)` identifies the underlying ledger record;
/// because watcher delivery is at-least-once across crashes, consumers
/// deduplicate on that pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    pub name: String,
    pub values: Vec<AbiValue>,
    pub block_number: u64,
    pub log_index: u64,
}

/// Errors that abort a watcher tick.
///
/// Provider and store errors are transient: the tick makes no progress,
/// the cursor does not move, and the next tick retries the same range.
/// Per-record codec errors never reach this type; the watcher downgrades
/// them to a skip of the single offending record.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("cursor store error: {0}")]
    Store(#[from] KvError),

    #[error(transparent)]
    Codec(#[from] CoderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_signature_and_topic_hash() {
        let sig = EventSignature::new(
            "Transfer",
            vec![ParamKind::Address, ParamKind::Address, ParamKind::Uint(256)],
        );
        assert_eq!(sig.canonical(), "Transfer(address,address,uint256)");
        // The well-known ERC20 transfer topic.
        assert_eq!(
            hex::encode(sig.topic_hash()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn nested_tuple_signature_rendering() {
        let sig = EventSignature::new(
            "CheckpointFinalized",
            vec![
                ParamKind::FixedBytes(32),
                ParamKind::tuple(vec![
                    ParamKind::tuple(vec![ParamKind::Uint(256), ParamKind::Uint(256)]),
                    ParamKind::tuple(vec![
                        ParamKind::Address,
                        ParamKind::Array(Box::new(ParamKind::Bytes)),
                    ]),
                ]),
            ],
        );
        assert_eq!(
            sig.canonical(),
            "CheckpointFinalized(bytes32,((uint256,uint256),(address,bytes[])))"
        );
    }
}
