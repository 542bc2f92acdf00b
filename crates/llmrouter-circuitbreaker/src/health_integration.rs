//! Lets the health monitor (C3) force a backend's circuit open or closed
//! without a direct dependency between the two crates.

use crate::registry::BackendCircuitBreaker;
use llmrouter_core::HealthTriggerable;

impl HealthTriggerable for BackendCircuitBreaker {
    fn trigger_unhealthy(&self) {
        let (circuit, config) = self.shared();
        tokio::spawn(async move {
            circuit.lock().await.force_open(&config);
        });
    }

    fn trigger_healthy(&self) {
        let (circuit, config) = self.shared();
        tokio::spawn(async move {
            circuit.lock().await.force_closed(&config);
        });
    }
}
