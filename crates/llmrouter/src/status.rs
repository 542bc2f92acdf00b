//! The orchestrator's point-in-time status report.

use crate::state::BackendState;
use llmrouter_cache::CacheStats;
use llmrouter_circuitbreaker::CircuitState;

/// One backend's combined lifecycle, health, and circuit state.
#[derive(Debug, Clone)]
pub struct BackendStatusEntry {
    pub name: String,
    pub state: BackendState,
    pub circuit_state: CircuitState,
    pub enabled: bool,
}

/// Snapshot returned by [`crate::Orchestrator::status`].
#[derive(Debug, Clone)]
pub struct OrchestratorStatus {
    pub backends: Vec<BackendStatusEntry>,
    pub cache: CacheStats,
    pub ledger_dropped: u64,
}
