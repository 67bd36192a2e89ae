use crate::events::cursor::CursorStore;
use crate::events::decoder::EventLogDecoder;
use crate::events::types::{EventLog, WatcherError};
use crate::provider::LedgerProvider;
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Polling configuration for one watched contract.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Time between ticks.
    pub poll_interval: Duration,
    /// First block queried when no cursor has ever been persisted.
    pub start_block: u64,
    /// Number of blocks to lag behind the reported head. Zero trusts the
    /// head outright; a deployment that wants reorg safety sets a
    /// confirmation lag here instead of relying on rollback logic, which
    /// this watcher does not have.
    pub confirmation_depth: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            start_block: 0,
            confirmation_depth: 0,
        }
    }
}

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener callback. Invoked synchronously during the tick, before the
/// cursor advances past the event's block. Dispatch runs against a
/// snapshot of the registry, so a handler may subscribe or unsubscribe
/// on its own watcher.
pub type EventHandler = Arc<dyn Fn(&EventLog) + Send + Sync>;

/// Diagnostic summary handed to the optional per-tick observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Events that reached at least one listener this tick.
    pub events_dispatched: usize,
    /// Cursor position after the tick, if one has been persisted.
    pub cursor: Option<u64>,
}

/// Optional callback invoked once per completed tick.
pub type TickObserver = Box<dyn Fn(&TickOutcome) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    handlers: HashMap<String, Vec<(ListenerId, EventHandler)>>,
}

/// Durable polling watcher for one contract's event logs.
///
/// Each tick queries the ledger from the block after the persisted cursor
/// up to the (confirmation-lagged) head, decodes the logs in ascending
/// `(block_number, log_index)` order, dispatches them to the listeners
/// registered for each event name, and only then advances the cursor to
/// the queried head. A crash between dispatch and cursor write makes the
/// next run re-deliver the same batch: at-least-once, never dropped.
///
/// One watcher, one contract, one polling task. Ticks run to completion
/// before the next is considered, so they never overlap; a tick that is
/// slower than the poll interval suppresses the missed fires instead of
/// queueing them.
pub struct EventWatcher {
    inner: Arc<WatcherInner>,
    // The polling task together with the epoch it was spawned under.
    task: Mutex<Option<(u64, JoinHandle<()>)>>,
}

struct WatcherInner {
    provider: Arc<dyn LedgerProvider>,
    decoder: EventLogDecoder,
    cursors: CursorStore,
    address: Address,
    config: WatcherConfig,
    listeners: Mutex<ListenerRegistry>,
    next_listener_id: AtomicU64,
    // Bumped by `cancel`. A polling loop runs only while the epoch still
    // matches the value it was spawned under, so a restart after cancel
    // never races the draining loop's exit.
    epoch: AtomicU64,
    cancel_notify: Notify,
}

impl EventWatcher {
    pub fn new(
        provider: Arc<dyn LedgerProvider>,
        decoder: EventLogDecoder,
        cursors: CursorStore,
        address: Address,
        config: WatcherConfig,
    ) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                provider,
                decoder,
                cursors,
                address,
                config,
                listeners: Mutex::new(ListenerRegistry::default()),
                next_listener_id: AtomicU64::new(1),
                epoch: AtomicU64::new(0),
                cancel_notify: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Register a handler for an event name. Handlers for the same name
    /// fire in registration order.
    pub fn subscribe(
        &self,
        event_name: &str,
        handler: impl Fn(&EventLog) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst));
        let mut registry = lock_registry(&self.inner.listeners);
        registry
            .handlers
            .entry(event_name.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Unknown names or ids are a
    /// no-op; other handlers are unaffected.
    pub fn unsubscribe(&self, event_name: &str, id: ListenerId) {
        let mut registry = lock_registry(&self.inner.listeners);
        if let Some(handlers) = registry.handlers.get_mut(event_name) {
            handlers.retain(|(registered, _)| *registered != id);
        }
    }

    /// Begin polling. A no-op if the polling task is already running;
    /// after `cancel`, `start` resumes from the persisted cursor. The
    /// optional observer is invoked once per completed tick.
    pub fn start(&self, on_tick: Option<TickObserver>) {
        let mut task = match self.task.lock() {
            Ok(task) => task,
            Err(poisoned) => poisoned.into_inner(),
        };
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        if let Some((task_epoch, handle)) = task.as_ref() {
            if *task_epoch == epoch && !handle.is_finished() {
                debug!(address = %self.inner.address, "watcher already polling");
                return;
            }
        }

        // A cancelled loop may still be draining an in-flight tick; the
        // new loop waits for it so ticks never overlap.
        let previous = task.take().map(|(_, handle)| handle);
        let inner = self.inner.clone();
        info!(address = %inner.address, "starting event watcher");
        *task = Some((
            epoch,
            tokio::spawn(async move {
                if let Some(previous) = previous {
                    let _ = previous.await;
                }
                let mut interval = tokio::time::interval(inner.config.poll_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = inner.cancel_notify.notified() => {}
                    }
                    // Cancellation is cooperative: checked at the tick
                    // boundary, never mid-tick.
                    if inner.epoch.load(Ordering::SeqCst) != epoch {
                        break;
                    }
                    match inner.poll_once().await {
                        Ok(outcome) => {
                            if let Some(observer) = &on_tick {
                                observer(&outcome);
                            }
                        }
                        Err(err) => {
                            warn!(
                                address = %inner.address,
                                "tick aborted, will retry next interval: {err}"
                            );
                        }
                    }
                }
                info!(address = %inner.address, "event watcher cancelled");
            }),
        ));
    }

    /// Stop scheduling ticks. An in-flight tick finishes; calling this on
    /// an idle watcher is a no-op. `start` resumes afterwards from the
    /// persisted cursor.
    pub fn cancel(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel_notify.notify_waiters();
    }

    /// Run exactly one tick. This is the same unit of work the polling
    /// task performs; exposed so callers and tests can drive the watcher
    /// deterministically.
    pub async fn poll_once(&self) -> Result<TickOutcome, WatcherError> {
        self.inner.poll_once().await
    }
}

impl WatcherInner {
    async fn poll_once(&self) -> Result<TickOutcome, WatcherError> {
        let cursor = self.cursors.get(self.address).await?;
        let from = match cursor {
            Some(last) => last + 1,
            None => self.config.start_block,
        };
        let head = self
            .provider
            .get_block_number()
            .await?
            .saturating_sub(self.config.confirmation_depth);
        if head < from {
            debug!(address = %self.address, head, from, "no new blocks");
            return Ok(TickOutcome {
                events_dispatched: 0,
                cursor,
            });
        }

        let mut logs = self.provider.get_logs(self.address, from, head).await?;
        // Listeners must observe ledger order regardless of how the
        // provider returns the batch.
        logs.sort_by_key(|log| (log.block_number, log.log_index));

        let mut events_dispatched = 0;
        for log in &logs {
            match self.decoder.decode_log(log) {
                Ok(Some(event)) => {
                    if self.dispatch(&event) {
                        events_dispatched += 1;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    // One malformed record must not abort the batch.
                    warn!(
                        address = %self.address,
                        block = log.block_number,
                        log_index = log.log_index,
                        "skipping undecodable log: {err}"
                    );
                }
            }
        }

        // The cursor moves only after the whole batch is dispatched; a
        // crash before this line re-delivers the batch on restart.
        self.cursors.advance(self.address, head).await?;
        debug!(
            address = %self.address,
            from,
            to = head,
            events_dispatched,
            "tick complete"
        );
        Ok(TickOutcome {
            events_dispatched,
            cursor: Some(head),
        })
    }

    fn dispatch(&self, event: &EventLog) -> bool {
        // Snapshot under the lock, invoke without it: handlers may
        // subscribe or unsubscribe on this same watcher.
        let handlers: Vec<EventHandler> = {
            let registry = lock_registry(&self.listeners);
            match registry.handlers.get(&event.name) {
                Some(handlers) => handlers.iter().map(|(_, h)| h.clone()).collect(),
                None => return false,
            }
        };
        for handler in &handlers {
            handler(event);
        }
        !handlers.is_empty()
    }
}

fn lock_registry(listeners: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    match listeners.lock() {
        Ok(guard) => guard,
        // A panicking listener must not wedge the watcher.
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{AbiValue, ParamKind, encode_params};
    use crate::db::{InMemoryKvStore, KeyValueStore, KvError};
    use crate::events::types::EventSignature;
    use crate::provider::RawLog;
    use crate::provider::mock::MockProvider;
    use crate::types::{Property, Range};
    use alloy_primitives::U256;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    const CONTRACT: Address = Address::repeat_byte(0x11);

    fn submitted_signature() -> EventSignature {
        EventSignature::new(
            "BlockSubmitted",
            vec![ParamKind::Uint(64), ParamKind::FixedBytes(32)],
        )
    }

    fn submitted_log(block_number: u64, log_index: u64, root_byte: u8) -> RawLog {
        let data = encode_params(&[
            (ParamKind::Uint(64), AbiValue::Uint(U256::from(block_number))),
            (
                ParamKind::FixedBytes(32),
                AbiValue::FixedBytes(vec![root_byte; 32]),
            ),
        ])
        .unwrap();
        RawLog {
            address: CONTRACT,
            topics: vec![submitted_signature().topic_hash()],
            data,
            block_number,
            log_index,
        }
    }

    fn watcher_with(provider: Arc<MockProvider>, kvs: Arc<dyn KeyValueStore>) -> EventWatcher {
        EventWatcher::new(
            provider,
            EventLogDecoder::new(vec![submitted_signature()]),
            CursorStore::new(kvs),
            CONTRACT,
            WatcherConfig {
                poll_interval: Duration::from_millis(10),
                start_block: 0,
                confirmation_depth: 0,
            },
        )
    }

    fn recording_listener() -> (
        Arc<Mutex<Vec<(u64, u64)>>>,
        impl Fn(&EventLog) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = move |event: &EventLog| {
            sink.lock()
                .unwrap()
                .push((event.block_number, event.log_index));
        };
        (seen, listener)
    }

    #[tokio::test]
    async fn delivers_events_in_ledger_order_across_ticks() {
        let provider = Arc::new(MockProvider::new());
        let watcher = watcher_with(provider.clone(), Arc::new(InMemoryKvStore::new()));
        let (seen, listener) = recording_listener();
        watcher.subscribe("BlockSubmitted", listener);

        // Shuffled insertion order; the watcher must still deliver in
        // (block, log index) order.
        provider.push_log(submitted_log(5, 1, 0xb));
        provider.push_log(submitted_log(5, 0, 0xa));
        provider.set_head(5);
        watcher.poll_once().await.unwrap();

        provider.push_log(submitted_log(7, 0, 0xc));
        provider.set_head(7);
        watcher.poll_once().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(5, 0), (5, 1), (7, 0)]);
    }

    #[tokio::test]
    async fn resumes_from_persisted_cursor_without_redelivery() {
        let provider = Arc::new(MockProvider::new());
        let kvs: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
        provider.push_log(submitted_log(3, 0, 0xa));
        provider.set_head(3);

        let first = watcher_with(provider.clone(), kvs.clone());
        let (seen, listener) = recording_listener();
        first.subscribe("BlockSubmitted", listener);
        first.poll_once().await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        // A fresh watcher over the same store starts past block 3.
        let second = watcher_with(provider.clone(), kvs);
        let (seen_again, listener) = recording_listener();
        second.subscribe("BlockSubmitted", listener);
        let outcome = second.poll_once().await.unwrap();
        assert_eq!(outcome.events_dispatched, 0);
        assert!(seen_again.lock().unwrap().is_empty());
    }

    /// Store whose puts can be made to fail, to simulate dying between
    /// dispatch and cursor persistence.
    struct FlakyStore {
        inner: Arc<dyn KeyValueStore>,
        fail_puts: Arc<AtomicBool>,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KvError> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(KvError::Storage("simulated crash".to_string()));
            }
            self.inner.put(key, value).await
        }

        fn bucket(&self, namespace: &[u8]) -> Arc<dyn KeyValueStore> {
            Arc::new(FlakyStore {
                inner: self.inner.bucket(namespace),
                fail_puts: self.fail_puts.clone(),
            })
        }
    }

    #[tokio::test]
    async fn crash_before_cursor_write_redelivers_the_batch() {
        let provider = Arc::new(MockProvider::new());
        let fail_puts = Arc::new(AtomicBool::new(true));
        let store: Arc<dyn KeyValueStore> = Arc::new(FlakyStore {
            inner: Arc::new(InMemoryKvStore::new()),
            fail_puts: fail_puts.clone(),
        });
        let watcher = watcher_with(provider.clone(), store);
        let (seen, listener) = recording_listener();
        watcher.subscribe("BlockSubmitted", listener);

        provider.push_log(submitted_log(5, 0, 0xa));
        provider.set_head(5);

        // Dispatch happens, then the cursor write fails.
        let err = watcher.poll_once().await.unwrap_err();
        assert!(matches!(err, WatcherError::Store(_)));
        assert_eq!(*seen.lock().unwrap(), vec![(5, 0)]);

        // Next tick redelivers the same event: at-least-once.
        fail_puts.store(false, Ordering::SeqCst);
        let outcome = watcher.poll_once().await.unwrap();
        assert_eq!(outcome.cursor, Some(5));
        assert_eq!(*seen.lock().unwrap(), vec![(5, 0), (5, 0)]);
    }

    #[tokio::test]
    async fn cursor_is_monotonic_even_if_the_head_moves_back() {
        let provider = Arc::new(MockProvider::new());
        let kvs: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
        let watcher = watcher_with(provider.clone(), kvs.clone());

        provider.set_head(103);
        watcher.poll_once().await.unwrap();
        assert_eq!(
            CursorStore::new(kvs.clone()).get(CONTRACT).await.unwrap(),
            Some(103)
        );

        // A provider briefly reporting an older head must not roll the
        // cursor back.
        provider.set_head(50);
        let outcome = watcher.poll_once().await.unwrap();
        assert_eq!(outcome.events_dispatched, 0);
        assert_eq!(
            CursorStore::new(kvs).get(CONTRACT).await.unwrap(),
            Some(103)
        );
    }

    #[tokio::test]
    async fn malformed_log_is_skipped_and_the_batch_continues() {
        let provider = Arc::new(MockProvider::new());
        let watcher = watcher_with(provider.clone(), Arc::new(InMemoryKvStore::new()));
        let (seen, listener) = recording_listener();
        watcher.subscribe("BlockSubmitted", listener);

        // Recognized topic, truncated data.
        provider.push_log(RawLog {
            address: CONTRACT,
            topics: vec![submitted_signature().topic_hash()],
            data: vec![0u8; 8],
            block_number: 4,
            log_index: 0,
        });
        provider.push_log(submitted_log(5, 0, 0xa));
        provider.set_head(5);

        let outcome = watcher.poll_once().await.unwrap();
        assert_eq!(outcome.events_dispatched, 1);
        assert_eq!(outcome.cursor, Some(5));
        assert_eq!(*seen.lock().unwrap(), vec![(5, 0)]);
    }

    #[tokio::test]
    async fn provider_outage_aborts_the_tick_without_moving_the_cursor() {
        let provider = Arc::new(MockProvider::new());
        let kvs: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
        let watcher = watcher_with(provider.clone(), kvs.clone());
        let (seen, listener) = recording_listener();
        watcher.subscribe("BlockSubmitted", listener);

        provider.push_log(submitted_log(2, 0, 0xa));
        provider.set_head(2);
        provider.fail_queries(true);
        let err = watcher.poll_once().await.unwrap_err();
        assert!(matches!(err, WatcherError::Provider(_)));
        assert_eq!(CursorStore::new(kvs).get(CONTRACT).await.unwrap(), None);

        // Recovery on the next tick.
        provider.fail_queries(false);
        watcher.poll_once().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(2, 0)]);
    }

    #[tokio::test]
    async fn unsubscribing_an_unknown_handler_is_a_no_op() {
        let provider = Arc::new(MockProvider::new());
        let watcher = watcher_with(provider.clone(), Arc::new(InMemoryKvStore::new()));
        let (seen, listener) = recording_listener();
        let kept = watcher.subscribe("BlockSubmitted", listener);
        let removed = watcher.subscribe("BlockSubmitted", |_| {});
        watcher.unsubscribe("BlockSubmitted", removed);

        // Never-registered combinations.
        watcher.unsubscribe("BlockSubmitted", removed);
        watcher.unsubscribe("NoSuchEvent", kept);

        provider.push_log(submitted_log(1, 0, 0xa));
        provider.set_head(1);
        watcher.poll_once().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(1, 0)]);
    }

    #[tokio::test]
    async fn confirmation_depth_lags_the_effective_head() {
        let provider = Arc::new(MockProvider::new());
        let watcher = EventWatcher::new(
            provider.clone(),
            EventLogDecoder::new(vec![submitted_signature()]),
            CursorStore::new(Arc::new(InMemoryKvStore::new())),
            CONTRACT,
            WatcherConfig {
                confirmation_depth: 3,
                ..WatcherConfig::default()
            },
        );
        let (seen, listener) = recording_listener();
        watcher.subscribe("BlockSubmitted", listener);

        provider.push_log(submitted_log(9, 0, 0xa));
        provider.set_head(10);
        let outcome = watcher.poll_once().await.unwrap();
        // Effective head is 7; block 9 is not confirmed yet.
        assert_eq!(outcome.cursor, Some(7));
        assert!(seen.lock().unwrap().is_empty());

        provider.set_head(12);
        watcher.poll_once().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(9, 0)]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_polls_and_cancel_stops_scheduling() {
        let provider = Arc::new(MockProvider::new());
        let watcher = watcher_with(provider.clone(), Arc::new(InMemoryKvStore::new()));
        provider.set_head(1);

        let ticks = Arc::new(AtomicU64::new(0));
        let counter = ticks.clone();
        watcher.start(Some(Box::new(move |_outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        // Starting again while polling is a no-op.
        watcher.start(None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ticks.load(Ordering::SeqCst) > 0);

        watcher.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_cancel = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);

        // Cancelling an already-cancelled watcher is a no-op.
        watcher.cancel();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_immediately_after_cancel_resumes_polling() {
        let provider = Arc::new(MockProvider::new());
        let watcher = watcher_with(provider.clone(), Arc::new(InMemoryKvStore::new()));
        provider.set_head(1);

        let first_ticks = Arc::new(AtomicU64::new(0));
        let counter = first_ticks.clone();
        watcher.start(Some(Box::new(move |_outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(first_ticks.load(Ordering::SeqCst) > 0);

        // Restart before the old loop has had a chance to observe the
        // cancellation; the new loop must still come up.
        watcher.cancel();
        let second_ticks = Arc::new(AtomicU64::new(0));
        let counter = second_ticks.clone();
        watcher.start(Some(Box::new(move |_outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(second_ticks.load(Ordering::SeqCst) > 0);

        watcher.cancel();
    }

    #[tokio::test]
    async fn handler_may_unsubscribe_itself_during_dispatch() {
        let provider = Arc::new(MockProvider::new());
        let watcher = Arc::new(watcher_with(
            provider.clone(),
            Arc::new(InMemoryKvStore::new()),
        ));

        // One-shot listener: removes itself on first delivery.
        let deliveries = Arc::new(AtomicU64::new(0));
        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));
        let counter = deliveries.clone();
        let slot = own_id.clone();
        let this = watcher.clone();
        let id = watcher.subscribe("BlockSubmitted", move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = slot.lock().unwrap().take() {
                this.unsubscribe("BlockSubmitted", id);
            }
        });
        *own_id.lock().unwrap() = Some(id);

        provider.push_log(submitted_log(1, 0, 0xa));
        provider.push_log(submitted_log(2, 0, 0xb));
        provider.set_head(2);
        let outcome = watcher.poll_once().await.unwrap();

        // The first event fires the listener once; the second finds no
        // listeners left.
        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.events_dispatched, 1);
        assert_eq!(outcome.cursor, Some(2));
    }

    #[tokio::test]
    async fn initial_watch_scenario() {
        // No cursor, start block 100; head 103 with one
        // CheckpointFinalized log at (102, 0).
        let checkpoint_signature = EventSignature::new(
            "CheckpointFinalized",
            vec![
                ParamKind::FixedBytes(32),
                ParamKind::tuple(vec![
                    ParamKind::tuple(vec![ParamKind::Uint(256), ParamKind::Uint(256)]),
                    Property::param_kind(),
                ]),
            ],
        );
        let property = Property::new(Address::repeat_byte(0x44), vec![vec![0xbe, 0xef]]);
        let data = encode_params(&[
            (
                ParamKind::FixedBytes(32),
                AbiValue::FixedBytes(vec![0xaa; 32]),
            ),
            (
                ParamKind::tuple(vec![
                    ParamKind::tuple(vec![ParamKind::Uint(256), ParamKind::Uint(256)]),
                    Property::param_kind(),
                ]),
                AbiValue::Tuple(vec![
                    AbiValue::Tuple(vec![
                        AbiValue::Uint(U256::from(0)),
                        AbiValue::Uint(U256::from(10)),
                    ]),
                    property.to_abi_value(),
                ]),
            ),
        ])
        .unwrap();

        let provider = Arc::new(MockProvider::new());
        provider.push_log(RawLog {
            address: CONTRACT,
            topics: vec![checkpoint_signature.topic_hash()],
            data,
            block_number: 102,
            log_index: 0,
        });
        provider.set_head(103);

        let kvs: Arc<dyn KeyValueStore> = Arc::new(InMemoryKvStore::new());
        let watcher = EventWatcher::new(
            provider,
            EventLogDecoder::new(vec![checkpoint_signature]),
            CursorStore::new(kvs.clone()),
            CONTRACT,
            WatcherConfig {
                start_block: 100,
                ..WatcherConfig::default()
            },
        );

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        watcher.subscribe("CheckpointFinalized", move |event: &EventLog| {
            let checkpoint = event.values[1].as_tuple().unwrap();
            let range = Range::from_abi(&checkpoint[0]).unwrap();
            let state = Property::from_abi(&checkpoint[1]).unwrap();
            sink.lock()
                .unwrap()
                .push((event.block_number, range, state));
        });

        let outcome = watcher.poll_once().await.unwrap();
        assert_eq!(outcome.events_dispatched, 1);
        assert_eq!(outcome.cursor, Some(103));
        assert_eq!(
            CursorStore::new(kvs).get(CONTRACT).await.unwrap(),
            Some(103)
        );

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (block, range, state) = &received[0];
        assert_eq!(*block, 102);
        assert_eq!(*range, Range::new(U256::from(0), U256::from(10)));
        assert_eq!(*state, property);
    }
}
