//! Shared helpers for the root integration tests.

use async_trait::async_trait;
use llmrouter_backend::Backend;
use llmrouter_core::{BackendDescriptor, BackendKind, HealthSample, Request, RequestMetadata, RequestOptions, Response, RouterError};
use llmrouter_health::HealthProbe;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn request(prompt: &str) -> Request {
    Request {
        prompt: prompt.to_string(),
        files: Vec::new(),
        options: RequestOptions::default(),
        metadata: RequestMetadata::new(false),
    }
}

/// A backend that fails its first `fail_count` calls with a retryable
/// error, then succeeds on every call after. Used to exercise fallback and
/// half-open recovery without any network.
pub struct FlakyBackend {
    descriptor: BackendDescriptor,
    fail_count: usize,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(name: impl Into<String>, fail_count: usize) -> Arc<Self> {
        Arc::new(Self {
            descriptor: BackendDescriptor {
                name: name.into(),
                kind: BackendKind::SelfHosted,
                priority: 0,
                cost_per_output_token: 0.0,
                endpoint: None,
                model: Some("flaky".to_string()),
                default_timeout: Duration::from_millis(200),
                enabled: true,
            },
            fail_count,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FlakyBackend {
    fn available(&self) -> bool {
        self.descriptor.enabled
    }

    fn estimate_cost(&self, _expected_tokens: u32) -> f64 {
        0.0
    }

    fn latency_score(&self) -> f64 {
        1.0
    }

    async fn send(&self, request: &Request, _deadline: Duration) -> Result<Response, RouterError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_count {
            return Err(RouterError::BackendTransient {
                backend: self.descriptor.name.clone(),
                reason: "simulated outage".to_string(),
            });
        }
        Ok(Response {
            content: format!("flaky response to: {}", request.prompt),
            backend_used: self.descriptor.name.clone(),
            tokens_input: 1,
            tokens_output: 1,
            cost: 0.0,
            latency_ms: 1,
            cache_hit: false,
            compression_ratio: None,
            backend_metadata: serde_json::Value::Null,
        })
    }

    fn validate_config(&self) -> bool {
        true
    }

    fn info(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }
}

/// A health probe that reports every backend healthy, unconditionally.
/// Stored as a concrete type (rather than a closure) so it can be named in
/// a `HealthMonitor<AlwaysHealthyProbe>` generic parameter.
pub struct AlwaysHealthyProbe;

impl HealthProbe for AlwaysHealthyProbe {
    fn probe(&self, backend: &str) -> impl Future<Output = HealthSample> + Send {
        let backend = backend.to_string();
        async move {
            HealthSample {
                backend,
                healthy: true,
                latency: Duration::from_millis(5),
                timestamp: Instant::now(),
                reason: None,
            }
        }
    }
}

/// A backend that always fails with a retryable error.
pub struct AlwaysFailsBackend {
    descriptor: BackendDescriptor,
}

impl AlwaysFailsBackend {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            descriptor: BackendDescriptor {
                name: name.into(),
                kind: BackendKind::Cloud,
                priority: 0,
                cost_per_output_token: 0.0,
                endpoint: None,
                model: Some("broken".to_string()),
                default_timeout: Duration::from_millis(200),
                enabled: true,
            },
        })
    }
}

#[async_trait]
impl Backend for AlwaysFailsBackend {
    fn available(&self) -> bool {
        true
    }

    fn estimate_cost(&self, _expected_tokens: u32) -> f64 {
        0.0
    }

    fn latency_score(&self) -> f64 {
        1.0
    }

    async fn send(&self, _request: &Request, _deadline: Duration) -> Result<Response, RouterError> {
        Err(RouterError::BackendTransient {
            backend: self.descriptor.name.clone(),
            reason: "simulated outage".to_string(),
        })
    }

    fn validate_config(&self) -> bool {
        true
    }

    fn info(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }
}
