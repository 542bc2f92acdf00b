//! Per-backend cached health state.

use crate::HealthStatus;
use llmrouter_core::HealthSample;
use std::time::Duration;

/// Hysteresis-smoothed health state for one backend: the last sample plus
/// consecutive success/failure counters, so a single flaky probe doesn't
/// flip the backend in and out of rotation.
#[derive(Debug, Clone, Default)]
pub struct BackendHealthState {
    /// Most recent probe result, `None` until the first probe completes.
    pub last_sample: Option<HealthSample>,
    consecutive_successes: u32,
    consecutive_failures: u32,
    /// Sticky status once thresholds are crossed; this is what callers see,
    /// not the raw last sample, to avoid flapping.
    confirmed_unhealthy: bool,
}

impl BackendHealthState {
    /// Folds a fresh sample into the running counters.
    pub fn record(&mut self, sample: HealthSample, failure_threshold: u32, success_threshold: u32) {
        if sample.healthy {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
            if self.consecutive_successes >= success_threshold {
                self.confirmed_unhealthy = false;
            }
        } else {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
            if self.consecutive_failures >= failure_threshold {
                self.confirmed_unhealthy = true;
            }
        }
        self.last_sample = Some(sample);
    }

    /// Derives the status a caller should act on: `Unknown` if there is no
    /// sample yet or the cached one is older than `ttl`, otherwise the
    /// hysteresis-confirmed status.
    pub fn status(&self, ttl: Duration) -> HealthStatus {
        let Some(sample) = &self.last_sample else {
            return HealthStatus::Unknown;
        };
        if sample.timestamp.elapsed() > ttl {
            return HealthStatus::Unknown;
        }
        if self.confirmed_unhealthy {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        }
    }
}
