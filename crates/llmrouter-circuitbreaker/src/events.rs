//! Events emitted by per-backend circuit breakers.

use crate::circuit::CircuitState;
use llmrouter_core::RouterEvent;
use std::time::Instant;

/// Observability events emitted by a backend's circuit breaker.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    /// The circuit changed state. Carries a human-readable reason per the
    /// design notes ("state transitions emit ... previous state and reason").
    StateTransition {
        backend: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
        reason: String,
    },
    CallPermitted {
        backend: String,
        timestamp: Instant,
        state: CircuitState,
    },
    CallRejected {
        backend: String,
        timestamp: Instant,
    },
    SuccessRecorded {
        backend: String,
        timestamp: Instant,
        state: CircuitState,
    },
    FailureRecorded {
        backend: String,
        timestamp: Instant,
        state: CircuitState,
    },
    SlowCallDetected {
        backend: String,
        timestamp: Instant,
        duration: std::time::Duration,
        state: CircuitState,
    },
}

impl RouterEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
            CircuitBreakerEvent::SlowCallDetected { .. } => "slow_call_detected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. }
            | CircuitBreakerEvent::SlowCallDetected { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { backend, .. }
            | CircuitBreakerEvent::CallPermitted { backend, .. }
            | CircuitBreakerEvent::CallRejected { backend, .. }
            | CircuitBreakerEvent::SuccessRecorded { backend, .. }
            | CircuitBreakerEvent::FailureRecorded { backend, .. }
            | CircuitBreakerEvent::SlowCallDetected { backend, .. } => backend,
        }
    }
}
