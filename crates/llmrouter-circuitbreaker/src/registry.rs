//! One circuit breaker per backend, looked up by backend name.

use crate::circuit::{Circuit, CircuitMetrics, CircuitState};
use crate::classifier::FailureClassifier;
use crate::config::CircuitBreakerConfig;
use llmrouter_core::RouterError;
use std::collections::HashMap;
use std::sync::atomic::AtomicU8;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A single backend's breaker: owns the async-guarded [`Circuit`] plus its
/// config, and exposes the call-wrapping contract from the design notes
/// ("on entry the breaker may refuse; on return it records outcome and
/// duration").
pub struct BackendCircuitBreaker {
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    config: Arc<CircuitBreakerConfig>,
}

impl BackendCircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        Self {
            circuit: Arc::new(Mutex::new(Circuit::new(Arc::clone(&state_atomic)))),
            state_atomic,
            config: Arc::new(config),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Runs `call` through the breaker: admission check, timing, and outcome
    /// recording. Returns `CircuitBreakerError::OpenCircuit` without running
    /// `call` at all if admission is refused.
    pub async fn call<F, Fut, T>(&self, call: F) -> Result<T, RouterError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, RouterError>>,
    {
        let admitted = {
            let mut circuit = self.circuit.lock().await;
            circuit.try_acquire(&self.config)
        };
        if !admitted {
            return Err(RouterError::BackendTransient {
                backend: self.config.name.clone(),
                reason: "circuit open".to_string(),
            });
        }

        let start = std::time::Instant::now();
        let result = call().await;
        let duration = start.elapsed();

        let mut circuit = self.circuit.lock().await;
        match &result {
            Ok(_) => circuit.record_success(&self.config, duration),
            Err(e) => {
                let counts_as_failure = self.config.failure_classifier.is_failure(&Err(e.clone()));
                if counts_as_failure {
                    circuit.record_failure(&self.config, duration, &e.to_string());
                } else {
                    circuit.record_success(&self.config, duration);
                }
            }
        }

        result
    }

    pub async fn state(&self) -> CircuitState {
        self.circuit.lock().await.state()
    }

    /// Lock-free state read, safe from sync contexts (e.g. the router's
    /// eligibility check in the selection hot path).
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(std::sync::atomic::Ordering::Acquire))
    }

    pub async fn metrics(&self) -> CircuitMetrics {
        self.circuit.lock().await.metrics(&self.config)
    }

    pub async fn force_open(&self) {
        self.circuit.lock().await.force_open(&self.config);
    }

    pub async fn force_closed(&self) {
        self.circuit.lock().await.force_closed(&self.config);
    }

    pub async fn reset(&self) {
        self.circuit.lock().await.reset(&self.config);
    }

    pub(crate) fn shared(&self) -> (Arc<Mutex<Circuit>>, Arc<CircuitBreakerConfig>) {
        (Arc::clone(&self.circuit), Arc::clone(&self.config))
    }
}

/// Owns one [`BackendCircuitBreaker`] per backend name, created lazily from
/// per-backend configuration supplied at orchestrator initialisation.
#[derive(Default)]
pub struct BreakerRegistry {
    breakers: HashMap<String, Arc<BackendCircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, config: CircuitBreakerConfig) -> Arc<BackendCircuitBreaker> {
        let name = config.name.clone();
        let breaker = Arc::new(BackendCircuitBreaker::new(config));
        self.breakers.insert(name, Arc::clone(&breaker));
        breaker
    }

    pub fn get(&self, backend_name: &str) -> Option<Arc<BackendCircuitBreaker>> {
        self.breakers.get(backend_name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.breakers.keys().map(String::as_str)
    }
}
