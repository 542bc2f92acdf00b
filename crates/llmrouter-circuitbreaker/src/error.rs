use thiserror::Error;

/// Errors the circuit breaker itself can raise, distinct from the errors a
/// backend call can fail with (those are `llmrouter_core::RouterError`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerError {
    /// The circuit is open (or half-open with no probe slots free); the call
    /// was never admitted.
    #[error("circuit is open; call not permitted")]
    OpenCircuit,
}
