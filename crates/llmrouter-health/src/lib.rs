//! Periodic and on-demand backend liveness probing (C3).
//!
//! Routing decisions must never block the hot path on a network call, so
//! [`HealthMonitor`] probes each enabled backend on a background interval
//! and caches the result with a TTL. The router reads [`HealthMonitor::cached`]
//! instead of probing directly.
//!
//! A probe is itself a call, and can trip a backend's circuit breaker just
//! like a real request would, but it runs under its own short
//! [`HealthMonitorConfig::probe_timeout`], independent of request timeouts.

mod config;
mod probe;
mod state;

#[cfg(feature = "triggers")]
mod triggers;

pub use config::{HealthMonitorConfig, HealthMonitorConfigBuilder};
pub use probe::HealthProbe;
pub use state::BackendHealthState;

use llmrouter_core::HealthSample;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Coarse health status derived from the most recent sample, used for
/// eligibility checks and selection scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Last probe succeeded and the cached sample is still fresh.
    Healthy,
    /// No sample yet, or the cached sample has exceeded its TTL.
    Unknown,
    /// Last probe failed.
    Unhealthy,
}

impl HealthStatus {
    /// Per the routing invariant: eligible unless positively known unhealthy.
    pub fn is_eligible(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy)
    }
}

/// Probes every registered backend on a background interval and serves
/// cached samples to callers on the hot path.
pub struct HealthMonitor<P> {
    states: Arc<RwLock<HashMap<String, BackendHealthState>>>,
    probe: Arc<P>,
    config: HealthMonitorConfig,
    task: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl<P> HealthMonitor<P>
where
    P: HealthProbe + 'static,
{
    /// Creates a monitor for the given set of backend names, all initially
    /// `Unknown` until the first probe completes.
    pub fn new(backends: Vec<String>, probe: P, config: HealthMonitorConfig) -> Self {
        let states = backends
            .into_iter()
            .map(|name| (name, BackendHealthState::default()))
            .collect();
        Self {
            states: Arc::new(RwLock::new(states)),
            probe: Arc::new(probe),
            config,
            task: Arc::new(RwLock::new(None)),
        }
    }

    /// Starts the background probing loop. Idempotent: calling twice while
    /// already running replaces the prior task.
    pub async fn start(&self) {
        let states = Arc::clone(&self.states);
        let probe = Arc::clone(&self.probe);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(config.initial_delay).await;
            let mut interval = tokio::time::interval(config.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let names: Vec<String> = states.read().await.keys().cloned().collect();
                for name in names {
                    run_one_probe(&states, &probe, &config, &name).await;
                }
            }
        });

        *self.task.write().await = Some(handle);
    }

    /// Stops the background probing loop.
    pub async fn stop(&self) {
        if let Some(handle) = self.task.write().await.take() {
            handle.abort();
        }
    }

    /// Forces an immediate probe of one backend, bypassing the interval,
    /// and returns the fresh sample. Used by the CLI's `health --backend X`.
    pub async fn probe_now(&self, backend: &str) -> Option<HealthSample> {
        if !self.states.read().await.contains_key(backend) {
            return None;
        }
        run_one_probe(&self.states, &self.probe, &self.config, backend).await;
        self.cached(backend).await.map(|(sample, _)| sample)
    }

    /// Returns the cached sample and derived status for a backend, without
    /// touching the network. `Unknown` if the cache is empty or stale.
    pub async fn cached(&self, backend: &str) -> Option<(HealthSample, HealthStatus)> {
        let states = self.states.read().await;
        let state = states.get(backend)?;
        let status = state.status(self.config.ttl);
        state.last_sample.clone().map(|sample| (sample, status))
    }

    /// Snapshot of every backend's current status, for the orchestrator's
    /// status report.
    pub async fn snapshot(&self) -> HashMap<String, HealthStatus> {
        let states = self.states.read().await;
        states
            .iter()
            .map(|(name, state)| (name.clone(), state.status(self.config.ttl)))
            .collect()
    }
}

async fn run_one_probe<P: HealthProbe>(
    states: &Arc<RwLock<HashMap<String, BackendHealthState>>>,
    probe: &Arc<P>,
    config: &HealthMonitorConfig,
    name: &str,
) {
    let result = tokio::time::timeout(config.probe_timeout, probe.probe(name)).await;
    let sample = match result {
        Ok(sample) => sample,
        Err(_) => HealthSample {
            backend: name.to_string(),
            healthy: false,
            latency: config.probe_timeout,
            timestamp: Instant::now(),
            reason: Some("probe timed out".to_string()),
        },
    };

    let mut states = states.write().await;
    if let Some(state) = states.get_mut(name) {
        let before = state.status(config.ttl);
        state.record(sample, config.failure_threshold, config.success_threshold);
        let after = state.status(config.ttl);

        #[cfg(feature = "triggers")]
        triggers::notify(&config.triggers, name, before, after);
        #[cfg(not(feature = "triggers"))]
        let _ = (before, after);

        #[cfg(feature = "tracing")]
        if before != after {
            tracing::info!(backend = name, ?before, ?after, "backend health transition");
        }
    }
}
