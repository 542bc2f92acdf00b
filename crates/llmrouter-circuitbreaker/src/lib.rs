//! Per-backend circuit breaker: failure tracking, pattern classification,
//! and progressive recovery.
//!
//! Every backend gets its own breaker via [`BreakerRegistry`]. A call is
//! wrapped end to end: [`BackendCircuitBreaker::call`] checks admission,
//! times the call, and records the outcome, classifying failures into
//! patterns ([`pattern::FailureKind`]) that drive both the recovery
//! strategy and the adjusted reset timeout.
//!
//! ## Basic example
//!
//! ```rust
//! use llmrouter_circuitbreaker::{BreakerRegistry, CircuitBreakerConfig};
//! use llmrouter_core::RouterError;
//!
//! # async fn example() {
//! let mut registry = BreakerRegistry::new();
//! let breaker = registry.register(
//!     CircuitBreakerConfig::builder("openai")
//!         .failure_rate_threshold(0.5)
//!         .sliding_window_size(20)
//!         .build(),
//! );
//!
//! let result: Result<String, RouterError> = breaker
//!     .call(|| async { Ok("response".to_string()) })
//!     .await;
//! # }
//! ```
//!
//! ## Feature flags
//! - `metrics`: counters and gauges via the `metrics` crate
//! - `tracing`: state-transition logging via the `tracing` crate
//! - `health-integration`: implements `llmrouter_core::HealthTriggerable`

pub mod circuit;
pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod pattern;
pub mod registry;

#[cfg(feature = "health-integration")]
pub mod health_integration;

pub use circuit::{CircuitMetrics, CircuitState};
pub use classifier::{DefaultClassifier, FailureClassifier, FnClassifier};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use pattern::{FailureKind, FailurePattern, RecoveryStrategy};
pub use registry::{BackendCircuitBreaker, BreakerRegistry};
