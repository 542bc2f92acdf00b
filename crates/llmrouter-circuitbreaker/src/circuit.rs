use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use crate::pattern::{adjusted_reset_timeout, FailurePatternTable};
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// State of one backend's circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CallRecord {
    is_failure: bool,
    is_slow: bool,
}

/// Point-in-time snapshot of a circuit's internal counters, safe to read
/// without touching the async-locked [`Circuit`] itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitMetrics {
    pub state: CircuitState,
    pub total_calls: usize,
    pub failure_count: usize,
    pub consecutive_failures: u32,
    pub failure_rate: f64,
    pub slow_call_rate: f64,
    pub time_since_state_change: Duration,
}

/// Per-backend circuit breaker state machine. Owned by one `Arc<Mutex<_>>`
/// per backend name, per the per-backend tracking in the data model.
pub struct Circuit {
    state: CircuitState,
    state_atomic: std::sync::Arc<AtomicU8>,
    last_state_change: Instant,
    last_failure: Option<Instant>,
    consecutive_failures: u32,
    window: VecDeque<CallRecord>,
    half_open_probes: usize,
    half_open_successes: usize,
    half_open_failures: usize,
    patterns: FailurePatternTable,
}

impl Circuit {
    pub fn new(state_atomic: std::sync::Arc<AtomicU8>) -> Self {
        Self {
            state: CircuitState::Closed,
            state_atomic,
            last_state_change: Instant::now(),
            last_failure: None,
            consecutive_failures: 0,
            window: VecDeque::new(),
            half_open_probes: 0,
            half_open_successes: 0,
            half_open_failures: 0,
            patterns: FailurePatternTable::new(),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn metrics(&self, config: &CircuitBreakerConfig) -> CircuitMetrics {
        let total = self.window.len();
        let failures = self.window.iter().filter(|r| r.is_failure).count();
        let slow = self.window.iter().filter(|r| r.is_slow).count();
        CircuitMetrics {
            state: self.state,
            total_calls: total,
            failure_count: failures,
            consecutive_failures: self.consecutive_failures,
            failure_rate: if total > 0 { failures as f64 / total as f64 } else { 0.0 },
            slow_call_rate: if total > 0 { slow as f64 / total as f64 } else { 0.0 },
            time_since_state_change: self.last_state_change.elapsed(),
        }
    }

    /// Call-admission check: CLOSED admits, HALF_OPEN admits while
    /// under the probe limit, OPEN admits only after the adjusted reset
    /// timeout has elapsed (and transitions to HALF_OPEN on admission).
    pub fn try_acquire(&mut self, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => {
                self.emit_permitted(config);
                true
            }
            CircuitState::Open => {
                let timeout = adjusted_reset_timeout(config.reset_timeout, self.patterns.dominant());
                if self.last_state_change.elapsed() >= timeout {
                    self.transition_to(
                        CircuitState::HalfOpen,
                        config,
                        "adjusted reset timeout elapsed",
                    );
                    self.half_open_probes += 1;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_rejected(config);
                    false
                }
            }
            CircuitState::HalfOpen => {
                if self.half_open_probes < config.permitted_calls_in_half_open {
                    self.half_open_probes += 1;
                    self.emit_permitted(config);
                    true
                } else {
                    self.emit_rejected(config);
                    false
                }
            }
        }
    }

    pub fn record_success(&mut self, config: &CircuitBreakerConfig, duration: Duration) {
        let is_slow = duration >= config.slow_call_threshold;
        self.push_window(config, CallRecord { is_failure: false, is_slow });

        if is_slow {
            self.emit_slow_call(config, duration);
        }
        config.event_listeners.emit(&CircuitBreakerEvent::SuccessRecorded {
            backend: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });
        #[cfg(feature = "metrics")]
        counter!("llmrouter_circuitbreaker_calls_total", "backend" => config.name.clone(), "outcome" => "success").increment(1);

        match self.state {
            CircuitState::Closed => {
                self.consecutive_failures = self.consecutive_failures.saturating_sub(1);
            }
            CircuitState::HalfOpen => {
                self.half_open_successes += 1;
                let total = self.half_open_successes + self.half_open_failures;
                let success_rate = self.half_open_successes as f64 / total.max(1) as f64;
                if success_rate >= config.recovery_fraction
                    && total >= config.permitted_calls_in_half_open
                {
                    self.transition_to(
                        CircuitState::Closed,
                        config,
                        "half-open recovery fraction met",
                    );
                    self.patterns.prune_stale(config.pattern_staleness, Instant::now());
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&mut self, config: &CircuitBreakerConfig, duration: Duration, error_text: &str) {
        let is_slow = duration >= config.slow_call_threshold;
        self.push_window(config, CallRecord { is_failure: true, is_slow });
        self.last_failure = Some(Instant::now());
        self.consecutive_failures += 1;
        self.patterns.record(error_text, duration, Instant::now());

        if is_slow {
            self.emit_slow_call(config, duration);
        }
        config.event_listeners.emit(&CircuitBreakerEvent::FailureRecorded {
            backend: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });
        #[cfg(feature = "metrics")]
        counter!("llmrouter_circuitbreaker_calls_total", "backend" => config.name.clone(), "outcome" => "failure").increment(1);

        match self.state {
            CircuitState::HalfOpen => {
                self.half_open_failures += 1;
                self.transition_to(CircuitState::Open, config, "failure during half-open probe");
            }
            CircuitState::Closed => self.evaluate_window(config),
            CircuitState::Open => {}
        }
    }

    pub fn force_open(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Open, config, "forced open");
    }

    pub fn force_closed(&mut self, config: &CircuitBreakerConfig) {
        self.transition_to(CircuitState::Closed, config, "forced closed");
        self.consecutive_failures = 0;
    }

    pub fn reset(&mut self, config: &CircuitBreakerConfig) {
        self.window.clear();
        self.consecutive_failures = 0;
        self.patterns = FailurePatternTable::new();
        self.transition_to(CircuitState::Closed, config, "manual reset");
    }

    fn push_window(&mut self, config: &CircuitBreakerConfig, record: CallRecord) {
        self.window.push_back(record);
        while self.window.len() > config.sliding_window_size {
            self.window.pop_front();
        }
    }

    fn evaluate_window(&mut self, config: &CircuitBreakerConfig) {
        let total = self.window.len();
        if total < config.minimum_number_of_calls.max(5) {
            return;
        }

        let failures = self.window.iter().filter(|r| r.is_failure).count();
        let slow = self.window.iter().filter(|r| r.is_slow).count();
        let failure_rate = failures as f64 / total as f64;
        let slow_rate = slow as f64 / total as f64;

        let should_open = self.consecutive_failures >= config.failure_threshold
            || failure_rate >= config.failure_rate_threshold
            || slow_rate >= config.slow_call_rate_threshold;

        if should_open {
            let reason = if self.consecutive_failures >= config.failure_threshold {
                format!("consecutive failures {} >= threshold", self.consecutive_failures)
            } else if failure_rate >= config.failure_rate_threshold {
                format!("failure rate {:.2} >= threshold", failure_rate)
            } else {
                format!("slow call rate {:.2} >= threshold", slow_rate)
            };
            self.transition_to(CircuitState::Open, config, &reason);
        }
    }

    fn transition_to(&mut self, state: CircuitState, config: &CircuitBreakerConfig, reason: &str) {
        if self.state == state {
            return;
        }
        let from_state = self.state;

        config.event_listeners.emit(&CircuitBreakerEvent::StateTransition {
            backend: config.name.clone(),
            timestamp: Instant::now(),
            from_state,
            to_state: state,
            reason: reason.to_string(),
        });

        #[cfg(feature = "tracing")]
        tracing::info!(backend = %config.name, from = ?from_state, to = ?state, reason, "circuit state transition");

        #[cfg(feature = "metrics")]
        {
            counter!(
                "llmrouter_circuitbreaker_transitions_total",
                "backend" => config.name.clone(),
                "to" => match state {
                    CircuitState::Closed => "closed",
                    CircuitState::Open => "open",
                    CircuitState::HalfOpen => "half_open",
                }
            )
            .increment(1);
            gauge!("llmrouter_circuitbreaker_state", "backend" => config.name.clone()).set(state as u8 as f64);
        }

        self.state = state;
        self.state_atomic.store(state as u8, Ordering::Release);
        self.last_state_change = Instant::now();
        self.half_open_probes = 0;
        self.half_open_successes = 0;
        self.half_open_failures = 0;
        if state != CircuitState::Open {
            // leave the window as-is for Closed (decays naturally); clear on
            // entering HalfOpen so probe results aren't polluted by history.
        }
        if state == CircuitState::HalfOpen {
            self.window.clear();
        }
    }

    fn emit_permitted(&self, config: &CircuitBreakerConfig) {
        config.event_listeners.emit(&CircuitBreakerEvent::CallPermitted {
            backend: config.name.clone(),
            timestamp: Instant::now(),
            state: self.state,
        });
    }

    fn emit_rejected(&self, config: &CircuitBreakerConfig) {
        config.event_listeners.emit(&CircuitBreakerEvent::CallRejected {
            backend: config.name.clone(),
            timestamp: Instant::now(),
        });
    }

    fn emit_slow_call(&self, config: &CircuitBreakerConfig, duration: Duration) {
        config.event_listeners.emit(&CircuitBreakerEvent::SlowCallDetected {
            backend: config.name.clone(),
            timestamp: Instant::now(),
            duration,
            state: self.state,
        });
    }
}
