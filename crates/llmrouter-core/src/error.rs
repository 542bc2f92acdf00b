//! Error taxonomy shared across the routing subsystem.
//!
//! [`RouterError`] is the single error type returned by the public
//! orchestrator API. Every component crate (circuit breaker, cache, health
//! monitor, pipeline) defines its own narrower error type and converts into
//! this one at its boundary, mirroring the way the rest of the workspace
//! keeps each component's `thiserror` enum local and composes them only at
//! the edges that need it.
//!
//! # Retryability
//!
//! Not every kind is eligible for fallback to the next backend. Use
//! [`RouterError::is_retryable`] to decide whether the router should try the
//! next candidate or stop and surface the error.

use std::time::Duration;
use thiserror::Error;

/// Per-backend attempt outcome, included in [`RouterError::NoHealthyBackend`]
/// so callers can see exactly what was tried and why it failed.
#[derive(Debug, Clone)]
pub struct AttemptedBackend {
    /// Name of the backend that was attempted.
    pub name: String,
    /// The error it returned.
    pub error: String,
}

/// The unified error taxonomy for the request-routing subsystem.
#[derive(Debug, Error, Clone)]
pub enum RouterError {
    /// Caller-supplied data failed validation. Not retryable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Initialisation could not proceed. Fatal at startup.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// A backend rejected credentials. Not retryable.
    #[error("authentication failed against backend `{backend}`: {reason}")]
    AuthenticationError {
        /// Backend that rejected the credentials.
        backend: String,
        /// Human-readable reason, if the backend provided one.
        reason: String,
    },

    /// A backend asked the caller to slow down. Retryable with backoff.
    #[error("backend `{backend}` is rate limiting us: {reason}")]
    RateLimited {
        /// Backend that rate-limited the request.
        backend: String,
        /// Reason text from the backend, if any.
        reason: String,
        /// Backend-suggested retry delay, if provided.
        retry_after: Option<Duration>,
    },

    /// A single attempt exceeded its per-attempt deadline. Retryable.
    #[error("backend `{backend}` timed out after {elapsed:?}")]
    BackendTimeout {
        /// Backend whose attempt timed out.
        backend: String,
        /// How long the attempt ran before being cut off.
        elapsed: Duration,
    },

    /// 5xx, connection failure, or unclassified I/O error. Retryable.
    #[error("backend `{backend}` returned a transient error: {reason}")]
    BackendTransient {
        /// Backend that failed transiently.
        backend: String,
        /// Reason text used by the circuit breaker's classifier.
        reason: String,
    },

    /// The prompt is too large even after compression and summarisation.
    /// Not retryable on the same backend, but callers may retry with a
    /// smaller prompt.
    #[error("context too large: {tokens} tokens exceeds the {limit} token cap")]
    ContextTooLarge {
        /// Estimated token count after preprocessing.
        tokens: usize,
        /// The configured cap that was exceeded.
        limit: usize,
    },

    /// The whole-pipeline deadline elapsed. Not retryable.
    #[error("request timed out after {elapsed:?} (deadline {deadline:?})")]
    RequestTimeout {
        /// Wall-clock time actually spent.
        elapsed: Duration,
        /// The deadline that was exceeded.
        deadline: Duration,
    },

    /// Every candidate backend refused or failed. Not retryable.
    #[error("no healthy backend available; attempted {}: {}", attempted.len(), summarize(attempted))]
    NoHealthyBackend {
        /// Every backend that was tried, and why it failed.
        attempted: Vec<AttemptedBackend>,
    },

    /// Path traversal, oversize payload, or other unsafe input. Always
    /// surfaced unmodified and logged at elevated severity.
    #[error("security violation: {0}")]
    Security(String),
}

fn summarize(attempted: &[AttemptedBackend]) -> String {
    attempted
        .iter()
        .map(|a| format!("{}: {}", a.name, a.error))
        .collect::<Vec<_>>()
        .join(", ")
}

impl RouterError {
    /// Returns true if the router should move on to the next candidate
    /// backend rather than surfacing this error immediately, per the
    /// propagation policy: `RateLimited`, `BackendTimeout`, and
    /// `BackendTransient` are recoverable locally; everything else halts
    /// routing.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RouterError::RateLimited { .. }
                | RouterError::BackendTimeout { .. }
                | RouterError::BackendTransient { .. }
        )
    }

    /// Returns true for errors that must be logged at elevated severity and
    /// never silently downgraded or retried.
    pub fn is_security(&self) -> bool {
        matches!(self, RouterError::Security(_))
    }

    /// Maps this error to the CLI exit code family described in the external
    /// interface contract (the CLI itself lives outside this crate, but the
    /// mapping is part of the contract the orchestrator must honour).
    pub fn exit_code(&self) -> i32 {
        match self {
            RouterError::ConfigurationError(_) => 2,
            RouterError::NoHealthyBackend { .. } => 3,
            RouterError::RequestTimeout { .. } => 4,
            _ => 1,
        }
    }

    /// A short, user-facing message that never leaks backend internals —
    /// the category-to-message map used by the propagation policy.
    pub fn user_message(&self) -> &'static str {
        match self {
            RouterError::InvalidInput(_) => "the request was invalid",
            RouterError::ConfigurationError(_) => "the service is misconfigured",
            RouterError::AuthenticationError { .. } => "a backend rejected our credentials",
            RouterError::RateLimited { .. } => "a backend is rate limiting requests",
            RouterError::BackendTimeout { .. } => "a backend took too long to respond",
            RouterError::BackendTransient { .. } => "a backend returned a transient error",
            RouterError::ContextTooLarge { .. } => "the prompt is too large to process",
            RouterError::RequestTimeout { .. } => "the request timed out",
            RouterError::NoHealthyBackend { .. } => "no healthy backend was available",
            RouterError::Security(_) => "the request was rejected for security reasons",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds_match_propagation_policy() {
        assert!(RouterError::RateLimited {
            backend: "a".into(),
            reason: "slow down".into(),
            retry_after: None
        }
        .is_retryable());
        assert!(RouterError::BackendTimeout {
            backend: "a".into(),
            elapsed: Duration::from_secs(1)
        }
        .is_retryable());
        assert!(RouterError::BackendTransient {
            backend: "a".into(),
            reason: "502".into()
        }
        .is_retryable());

        assert!(!RouterError::InvalidInput("bad".into()).is_retryable());
        assert!(!RouterError::AuthenticationError {
            backend: "a".into(),
            reason: "bad key".into()
        }
        .is_retryable());
        assert!(!RouterError::Security("path traversal".into()).is_retryable());
    }

    #[test]
    fn exit_codes_match_cli_contract() {
        assert_eq!(RouterError::ConfigurationError("x".into()).exit_code(), 2);
        assert_eq!(
            RouterError::NoHealthyBackend { attempted: vec![] }.exit_code(),
            3
        );
        assert_eq!(
            RouterError::RequestTimeout {
                elapsed: Duration::from_secs(5),
                deadline: Duration::from_secs(5)
            }
            .exit_code(),
            4
        );
        assert_eq!(RouterError::InvalidInput("x".into()).exit_code(), 1);
    }

    #[test]
    fn no_healthy_backend_summarizes_attempts() {
        let err = RouterError::NoHealthyBackend {
            attempted: vec![
                AttemptedBackend {
                    name: "a".into(),
                    error: "auth failed".into(),
                },
                AttemptedBackend {
                    name: "b".into(),
                    error: "auth failed".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("a: auth failed"));
        assert!(msg.contains("b: auth failed"));
    }
}
