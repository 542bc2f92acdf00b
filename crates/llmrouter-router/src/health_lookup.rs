//! Narrow health-status lookup the router consumes, so it depends on
//! [`llmrouter_health::HealthMonitor`]'s behaviour without being generic
//! over its probe type.

use llmrouter_health::{HealthMonitor, HealthProbe, HealthStatus};

/// Read-only eligibility lookup by backend name.
#[async_trait::async_trait]
pub trait HealthLookup: Send + Sync {
    async fn status(&self, backend: &str) -> HealthStatus;
}

#[async_trait::async_trait]
impl<P> HealthLookup for HealthMonitor<P>
where
    P: HealthProbe + 'static,
{
    async fn status(&self, backend: &str) -> HealthStatus {
        self.cached(backend)
            .await
            .map(|(_, status)| status)
            .unwrap_or(HealthStatus::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::HealthSample;
    use std::time::{Duration, Instant};

    struct AlwaysHealthy;

    impl HealthProbe for AlwaysHealthy {
        async fn probe(&self, backend: &str) -> HealthSample {
            HealthSample {
                backend: backend.to_string(),
                healthy: true,
                latency: Duration::from_millis(1),
                timestamp: Instant::now(),
                reason: None,
            }
        }
    }

    #[tokio::test]
    async fn unknown_backend_reports_unknown_status() {
        let monitor = HealthMonitor::new(
            vec!["a".to_string()],
            AlwaysHealthy,
            Default::default(),
        );
        let lookup: &dyn HealthLookup = &monitor;
        assert_eq!(lookup.status("missing").await, HealthStatus::Unknown);
    }
}
