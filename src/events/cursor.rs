use crate::db::{KeyValueStore, KvError};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Persisted cursor record, one per watched contract.
#[derive(Debug, Serialize, Deserialize)]
struct CursorRecord {
    last_processed_block: u64,
    updated_at: DateTime<Utc>,
}

/// Durable last-processed-block marker per contract.
///
/// The cursor is the crash-recovery anchor: it only moves forward, and
/// only after a batch has been fully dispatched. A watcher that dies
/// mid-batch restarts from the old value and re-queries the same range,
/// which is why delivery is at-least-once.
pub struct CursorStore {
    store: Arc<dyn KeyValueStore>,
}

impl CursorStore {
    /// Callers hand in an already-scoped bucket, e.g.
    /// `kvs.bucket(b"event")`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Last processed block for `address`, if any was ever persisted.
    ///
    /// An unparsable record is treated as absent so a corrupted store
    /// degrades to a re-scan from the configured start block rather than
    /// a wedged watcher.
    pub async fn get(&self, address: Address) -> Result<Option<u64>, KvError> {
        let Some(bytes) = self.store.get(address.as_slice()).await? else {
            return Ok(None);
        };
        match serde_json::from_slice::<CursorRecord>(&bytes) {
            Ok(record) => Ok(Some(record.last_processed_block)),
            Err(err) => {
                warn!(%address, "unreadable cursor record, treating as absent: {err}");
                Ok(None)
            }
        }
    }

    /// Advance the cursor to `block`. Never decreases: an advance at or
    /// below the stored value is a no-op.
    pub async fn advance(&self, address: Address, block: u64) -> Result<(), KvError> {
        if let Some(current) = self.get(address).await? {
            if block <= current {
                debug!(
                    %address,
                    current,
                    requested = block,
                    "cursor advance ignored, would not move forward"
                );
                return Ok(());
            }
        }
        let record = CursorRecord {
            last_processed_block: block,
            updated_at: Utc::now(),
        };
        self.store
            .put(address.as_slice(), &serde_json::to_vec(&record)?)
            .await?;
        debug!(%address, block, "cursor advanced");
        Ok(())
    }
}
