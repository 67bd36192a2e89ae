use crate::coder::{CoderError, decode};
use crate::events::types::{EventLog, EventSignature};
use crate::provider::RawLog;
use alloy_primitives::B256;
use std::collections::HashMap;
use tracing::debug;

/// Turns raw ledger logs into named events using a contract's signature
/// table.
///
/// The table is immutable configuration fixed at construction. A log
/// whose topic hash is not in the table is not an error; contracts emit
/// plenty of events a given watcher does not care about.
pub struct EventLogDecoder {
    signatures: HashMap<B256, EventSignature>,
}

impl EventLogDecoder {
    pub fn new(signatures: Vec<EventSignature>) -> Self {
        Self {
            signatures: signatures
                .into_iter()
                .map(|sig| (sig.topic_hash(), sig))
                .collect(),
        }
    }

    /// Decode one raw log.
    ///
    /// `Ok(None)` when the log carries no topics or an unknown topic hash.
    /// A recognized topic with data that does not fit the declared
    /// parameter list fails with [`CoderError::Mismatch`]; the caller
    /// decides whether that skips the record or aborts.
    pub fn decode_log(&self, raw: &RawLog) -> Result<Option<EventLog>, CoderError> {
        let Some(topic) = raw.topics.first() else {
            debug!(
                block = raw.block_number,
                log_index = raw.log_index,
                "skipping log without topics"
            );
            return Ok(None);
        };
        let Some(signature) = self.signatures.get(topic) else {
            debug!(
                block = raw.block_number,
                log_index = raw.log_index,
                topic = %topic,
                "skipping log with unknown topic"
            );
            return Ok(None);
        };
        let values = decode(&signature.inputs, &raw.data)?;
        Ok(Some(EventLog {
            name: signature.name.clone(),
            values,
            block_number: raw.block_number,
            log_index: raw.log_index,
        }))
    }
}
