//! Core infrastructure shared across the llmrouter workspace.
//!
//! This crate provides the pieces every component crate (circuit breaker,
//! health monitor, cache, router, pipeline) needs and none of them should
//! redefine:
//! - [`events`]: the observability event system (`RouterEvent`, `EventListeners`)
//! - [`error`]: the unified [`RouterError`] taxonomy returned by the public API
//! - [`health_integration`]: the trait that lets the health monitor drive a
//!   circuit breaker's state without a direct dependency between the crates

pub mod error;
pub mod events;
pub mod types;

#[cfg(feature = "health-integration")]
pub mod health_integration;

pub use error::{AttemptedBackend, RouterError};
pub use events::{BoxedEventListener, EventListener, EventListeners, FnListener, RouterEvent};
pub use types::{
    BackendDescriptor, BackendKind, Fingerprint, HealthSample, Request, RequestMetadata,
    RequestOptions, Response,
};

#[cfg(feature = "health-integration")]
pub use health_integration::{HealthTriggerable, SharedHealthTrigger, TriggerHealth};
