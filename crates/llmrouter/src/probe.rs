//! Health probe implementation backed by real backend adaptors: a probe is
//! just a minimal [`Backend::send`] call under its own short timeout,
//! independent of any in-flight request's deadline.

use llmrouter_backend::Backend;
use llmrouter_core::{HealthSample, Request, RequestMetadata, RequestOptions};
use llmrouter_health::HealthProbe;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Probes a backend by sending it a trivial prompt and timing the round
/// trip. Unknown backend names are reported unhealthy rather than panicking.
pub struct BackendHealthProbe {
    backends: Arc<HashMap<String, Arc<dyn Backend>>>,
    probe_timeout: Duration,
}

impl BackendHealthProbe {
    pub fn new(backends: Arc<HashMap<String, Arc<dyn Backend>>>, probe_timeout: Duration) -> Self {
        Self { backends, probe_timeout }
    }
}

fn probe_request() -> Request {
    Request {
        prompt: "ping".to_string(),
        files: Vec::new(),
        options: RequestOptions::default(),
        metadata: RequestMetadata::new(true),
    }
}

impl HealthProbe for BackendHealthProbe {
    fn probe(&self, backend: &str) -> impl Future<Output = HealthSample> + Send {
        let backend_handle = self.backends.get(backend).cloned();
        let probe_timeout = self.probe_timeout;
        let name = backend.to_string();

        async move {
            let start = Instant::now();
            let Some(backend_handle) = backend_handle else {
                return HealthSample {
                    backend: name,
                    healthy: false,
                    latency: Duration::ZERO,
                    timestamp: Instant::now(),
                    reason: Some("backend not registered".to_string()),
                };
            };

            match backend_handle.send(&probe_request(), probe_timeout).await {
                Ok(_) => HealthSample {
                    backend: name,
                    healthy: true,
                    latency: start.elapsed(),
                    timestamp: Instant::now(),
                    reason: None,
                },
                Err(err) => HealthSample {
                    backend: name,
                    healthy: false,
                    latency: start.elapsed(),
                    timestamp: Instant::now(),
                    reason: Some(err.to_string()),
                },
            }
        }
    }
}
