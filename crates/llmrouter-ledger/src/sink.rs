//! The durable write target a [`crate::UsageLedger`] drains into.
//!
//! The ledger itself only owns the bounded queue and the drain loop; where
//! rows actually land (a local database, a file, nothing at all in tests) is
//! this trait's job, so the ledger crate never has to pick a storage engine.

use crate::entry::LedgerEntry;

/// A place `LedgerEntry` rows are written. Implementations should be cheap
/// and local: the drain loop calls this inline, not under a pipeline
/// deadline, but a slow sink still backs up the queue.
pub trait LedgerSink: Send + Sync {
    fn write(&self, entry: LedgerEntry);
}

/// An in-process sink backed by a `Vec`, useful for tests and for running
/// without a configured durable store.
#[derive(Default)]
pub struct InMemorySink {
    entries: std::sync::Mutex<Vec<LedgerEntry>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().expect("ledger sink mutex poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("ledger sink mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerSink for InMemorySink {
    fn write(&self, entry: LedgerEntry) {
        self.entries.lock().expect("ledger sink mutex poisoned").push(entry);
    }
}
