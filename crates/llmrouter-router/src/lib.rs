//! Weighted backend scoring and ordered-fallback dispatch (C4).
//!
//! [`Router::dispatch`] produces an ordered candidate list from the
//! registered backends, then attempts each in turn through its circuit
//! breaker until one succeeds, a non-retryable error stops the sequence, or
//! every candidate is exhausted.

mod config;
mod health_lookup;
mod scoring;

pub use config::{RouterConfig, RouterConfigBuilder, ScoringWeights};
pub use health_lookup::HealthLookup;

use llmrouter_backend::Backend;
use llmrouter_circuitbreaker::BreakerRegistry;
use llmrouter_core::{AttemptedBackend, Request, RouterError, Response};
use scoring::RawCandidate;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns the registered backends and consults health and circuit-breaker
/// state to rank and dispatch each request.
pub struct Router {
    backends: Vec<Arc<dyn Backend>>,
    breakers: Arc<BreakerRegistry>,
    health: Arc<dyn HealthLookup>,
    config: RouterConfig,
}

impl Router {
    pub fn new(
        backends: Vec<Arc<dyn Backend>>,
        breakers: Arc<BreakerRegistry>,
        health: Arc<dyn HealthLookup>,
        config: RouterConfig,
    ) -> Self {
        Self {
            backends,
            breakers,
            health,
            config,
        }
    }

    /// Builds the ranked candidate list for `request`, per the eligibility
    /// invariant: enabled, health-eligible, and not on an OPEN circuit.
    async fn ranked_candidates(&self, request: &Request) -> Vec<Arc<dyn Backend>> {
        let expected_tokens = request
            .options
            .max_tokens
            .unwrap_or(self.config.default_expected_tokens);

        let mut raw = Vec::new();
        let mut by_name = std::collections::HashMap::new();

        for backend in &self.backends {
            let descriptor = backend.info();
            if !descriptor.enabled {
                continue;
            }
            let health_status = self.health.status(&descriptor.name).await;
            if !health_status.is_eligible() {
                continue;
            }
            let circuit_state = self
                .breakers
                .get(&descriptor.name)
                .map(|b| b.state_sync())
                .unwrap_or(llmrouter_circuitbreaker::CircuitState::Closed);
            if circuit_state == llmrouter_circuitbreaker::CircuitState::Open {
                continue;
            }

            by_name.insert(descriptor.name.clone(), Arc::clone(backend));
            raw.push(RawCandidate {
                descriptor,
                cost: backend.estimate_cost(expected_tokens),
                latency: backend.latency_score(),
                circuit_state,
            });
        }

        scoring::rank(raw, self.config.weights)
            .into_iter()
            .filter_map(|scored| by_name.remove(&scored.backend_name))
            .collect()
    }

    /// Attempts candidates in ranked order until one succeeds or the
    /// sequence is exhausted. `deadline_at` is the whole-pipeline deadline;
    /// each attempt gets whatever remains of it, capped at the backend's
    /// own default timeout.
    pub async fn dispatch(
        &self,
        request: &Request,
        deadline_at: Instant,
    ) -> Result<Response, RouterError> {
        let candidates = self.ranked_candidates(request).await;
        if candidates.is_empty() {
            return Err(RouterError::NoHealthyBackend { attempted: vec![] });
        }

        let mut attempted = Vec::new();

        for backend in candidates {
            let descriptor = backend.info();
            let remaining = deadline_at.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let per_attempt_deadline = remaining.min(descriptor.default_timeout);

            let Some(breaker) = self.breakers.get(&descriptor.name) else {
                continue;
            };

            let result = breaker
                .call(|| backend.send(request, per_attempt_deadline))
                .await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) => {
                    let retryable = err.is_retryable();
                    attempted.push(AttemptedBackend {
                        name: descriptor.name.clone(),
                        error: err.to_string(),
                    });
                    if retryable && self.config.fallback_enabled {
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(RouterError::NoHealthyBackend { attempted })
    }
}

/// Convenience for callers deriving a per-attempt deadline outside of
/// [`Router::dispatch`] (e.g. the health monitor's forced probes).
pub fn attempt_deadline(remaining: Duration, backend_default: Duration) -> Duration {
    remaining.min(backend_default)
}
