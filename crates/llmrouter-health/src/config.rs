//! Health monitor configuration.

use std::time::Duration;

#[cfg(feature = "triggers")]
use llmrouter_core::SharedHealthTrigger;

/// Tunables for [`crate::HealthMonitor`].
#[derive(Clone)]
pub struct HealthMonitorConfig {
    /// How often the background loop re-probes every backend.
    pub interval: Duration,
    /// Delay before the first probe, to let the process finish starting up.
    pub initial_delay: Duration,
    /// Dedicated timeout for a single probe, independent of request timeouts.
    pub probe_timeout: Duration,
    /// How long a cached sample is considered fresh before it reports
    /// `Unknown` rather than stale data.
    pub ttl: Duration,
    /// Consecutive failed probes required to flip a backend to `Unhealthy`.
    pub failure_threshold: u32,
    /// Consecutive successful probes required to clear `Unhealthy`.
    pub success_threshold: u32,
    #[cfg(feature = "triggers")]
    pub(crate) triggers: Vec<SharedHealthTrigger>,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            initial_delay: Duration::from_secs(0),
            probe_timeout: Duration::from_secs(3),
            ttl: Duration::from_secs(60),
            failure_threshold: 2,
            success_threshold: 1,
            #[cfg(feature = "triggers")]
            triggers: Vec::new(),
        }
    }
}

impl HealthMonitorConfig {
    /// Starts a builder seeded with the defaults above.
    pub fn builder() -> HealthMonitorConfigBuilder {
        HealthMonitorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Chained-method builder for [`HealthMonitorConfig`].
pub struct HealthMonitorConfigBuilder {
    config: HealthMonitorConfig,
}

impl HealthMonitorConfigBuilder {
    /// Sets the background probe interval.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Sets the startup delay before the first probe.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    /// Sets the per-probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    /// Sets the cache TTL after which a sample reports `Unknown`.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    /// Sets the consecutive-failure threshold to confirm `Unhealthy`.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold.max(1);
        self
    }

    /// Sets the consecutive-success threshold to clear `Unhealthy`.
    pub fn success_threshold(mut self, threshold: u32) -> Self {
        self.config.success_threshold = threshold.max(1);
        self
    }

    /// Registers a circuit breaker (or other) trigger to notify on
    /// confirmed health transitions.
    #[cfg(feature = "triggers")]
    pub fn with_trigger(mut self, trigger: SharedHealthTrigger) -> Self {
        self.config.triggers.push(trigger);
        self
    }

    /// Finalises the configuration.
    pub fn build(self) -> HealthMonitorConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_ballpark() {
        let config = HealthMonitorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert!(config.probe_timeout < config.interval);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = HealthMonitorConfig::builder()
            .interval(Duration::from_secs(10))
            .failure_threshold(5)
            .build();
        assert_eq!(config.interval, Duration::from_secs(10));
        assert_eq!(config.failure_threshold, 5);
    }
}
