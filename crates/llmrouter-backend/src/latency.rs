//! Rolling latency tracker shared by the HTTP-backed adaptors.

use std::collections::VecDeque;
use std::sync::Mutex;

const WINDOW: usize = 20;

/// Tracks a bounded window of observed send latencies and exposes their
/// mean as the adaptor's `latency_score`.
pub struct LatencyTracker {
    samples: Mutex<VecDeque<f64>>,
    default_ms: f64,
}

impl LatencyTracker {
    pub fn new(default_ms: f64) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(WINDOW)),
            default_ms,
        }
    }

    pub fn record(&self, latency_ms: f64) {
        let mut samples = self.samples.lock().expect("latency tracker mutex poisoned");
        if samples.len() == WINDOW {
            samples.pop_front();
        }
        samples.push_back(latency_ms);
    }

    /// The mean of the current window, or the adaptor's configured default
    /// when no samples have been recorded yet.
    pub fn mean(&self) -> f64 {
        let samples = self.samples.lock().expect("latency tracker mutex poisoned");
        if samples.is_empty() {
            return self.default_ms;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}
