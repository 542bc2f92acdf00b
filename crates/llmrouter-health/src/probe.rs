//! The liveness probe contract.

use llmrouter_core::HealthSample;
use std::future::Future;

/// Performs the cheapest liveness check a backend adaptor offers.
///
/// Implementations normally wrap a [`llmrouter_core`]-level backend handle;
/// this trait deliberately takes only a backend name so the health crate
/// never has to depend on the backend adaptor crate.
pub trait HealthProbe: Send + Sync {
    /// Probes the named backend and returns a fresh sample. Must not block
    /// past the monitor's configured probe timeout on its own; the monitor
    /// wraps every call in `tokio::time::timeout` regardless.
    fn probe(&self, backend: &str) -> impl Future<Output = HealthSample> + Send;
}

impl<F, Fut> HealthProbe for F
where
    F: Fn(&str) -> Fut + Send + Sync,
    Fut: Future<Output = HealthSample> + Send,
{
    fn probe(&self, backend: &str) -> impl Future<Output = HealthSample> + Send {
        self(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn closure_probe_runs() {
        let probe = |name: &str| {
            let name = name.to_string();
            async move {
                HealthSample {
                    backend: name,
                    healthy: true,
                    latency: std::time::Duration::from_millis(5),
                    timestamp: Instant::now(),
                    reason: None,
                }
            }
        };

        let sample = probe.probe("openai").await;
        assert!(sample.healthy);
        assert_eq!(sample.backend, "openai");
    }
}
