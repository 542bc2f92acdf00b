//! Append-only usage ledger (C6).
//!
//! [`UsageLedger::record`] never blocks the caller: every entry is pushed
//! onto a bounded channel and a background task drains it into a
//! [`LedgerSink`]. A full queue drops the entry and increments a counter
//! instead of applying backpressure — the ledger is advisory, not
//! authoritative, so a burst of drops degrades observability, not request
//! handling.

mod entry;
mod sink;

pub use entry::LedgerEntry;
pub use sink::{InMemorySink, LedgerSink};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

/// Default capacity of the in-flight write queue before entries start
/// getting dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Owns the bounded write queue and the background drain task.
pub struct UsageLedger {
    sink: Arc<dyn LedgerSink>,
    queue_tx: mpsc::Sender<LedgerEntry>,
    queue_rx: AsyncMutex<Option<mpsc::Receiver<LedgerEntry>>>,
    dropped: Arc<AtomicU64>,
    task: AsyncMutex<Option<JoinHandle<()>>>,
}

impl UsageLedger {
    pub fn new(sink: Arc<dyn LedgerSink>, queue_capacity: usize) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity.max(1));
        Self {
            sink,
            queue_tx,
            queue_rx: AsyncMutex::new(Some(queue_rx)),
            dropped: Arc::new(AtomicU64::new(0)),
            task: AsyncMutex::new(None),
        }
    }

    /// Starts the background drain task. Idempotent: a second call while
    /// already running is a no-op (the receiver has already been taken).
    pub async fn start(&self) {
        let mut rx_slot = self.queue_rx.lock().await;
        let Some(mut rx) = rx_slot.take() else {
            return;
        };
        let sink = Arc::clone(&self.sink);

        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                sink.write(entry);
            }
        });

        *self.task.lock().await = Some(handle);
    }

    /// Gives the drain task up to `grace` to work through anything still
    /// queued, then aborts it. The sender stays alive for the struct's own
    /// lifetime, so this never waits for a natural end-of-channel.
    pub async fn stop(&self, grace: std::time::Duration) {
        if let Some(handle) = self.task.lock().await.take() {
            tokio::time::sleep(grace).await;
            handle.abort();
        }
    }

    /// Enqueues one entry. Never blocks: on a full queue, drops the entry
    /// and increments [`UsageLedger::dropped_count`].
    pub fn record(&self, entry: LedgerEntry) {
        if self.queue_tx.try_send(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::warn!("usage ledger queue full, dropping entry");
            #[cfg(feature = "metrics")]
            metrics::counter!("llmrouter_ledger_dropped_total").increment(1);
        }
    }

    /// Total entries dropped for queue overflow since construction.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
