//! Durable event watching.
//!
//! A [`EventWatcher`] polls one contract for logs, decodes them against the
//! registered [`EventSignature`]s, and hands each [`EventLog`] to the
//! subscribed listeners in ledger order. The high-water mark lives in a
//! [`CursorStore`] and only advances after a batch has been dispatched, so
//! delivery is at-least-once across restarts.

mod cursor;
mod decoder;
mod types;
mod watcher;

pub use cursor::CursorStore;
pub use decoder::EventLogDecoder;
pub use types::{EventLog, EventSignature, WatcherError};
pub use watcher::{
    EventHandler, EventWatcher, ListenerId, TickObserver, TickOutcome, WatcherConfig,
};
