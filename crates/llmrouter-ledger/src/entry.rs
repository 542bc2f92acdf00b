//! The row written for every completed request.

use llmrouter_core::Fingerprint;
use std::time::SystemTime;

/// One append-only ledger row. Written for every completed request,
/// including cache hits (with zero tokens and zero cost).
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub timestamp: SystemTime,
    pub backend: String,
    pub fingerprint: Fingerprint,
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub cost: f64,
    pub cache_hit: bool,
    pub latency_ms: u64,
}
