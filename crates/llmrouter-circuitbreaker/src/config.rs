use crate::classifier::{DefaultClassifier, FailureClassifier};
use crate::events::CircuitBreakerEvent;
use llmrouter_core::EventListeners;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for one backend's circuit breaker.
///
/// Built once per backend at orchestrator initialisation and shared (via
/// `Arc`) with the [`crate::circuit::Circuit`] it governs.
pub struct CircuitBreakerConfig {
    pub(crate) name: String,
    pub(crate) failure_threshold: u32,
    pub(crate) failure_rate_threshold: f64,
    pub(crate) slow_call_rate_threshold: f64,
    pub(crate) slow_call_threshold: Duration,
    pub(crate) sliding_window_size: usize,
    pub(crate) minimum_number_of_calls: usize,
    pub(crate) reset_timeout: Duration,
    pub(crate) permitted_calls_in_half_open: usize,
    pub(crate) recovery_fraction: f64,
    pub(crate) pattern_staleness: Duration,
    pub(crate) failure_classifier: Arc<dyn FailureClassifier>,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
    pub fn builder(name: impl Into<String>) -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new(name)
    }
}

/// Builder for [`CircuitBreakerConfig`], matching the chained-method idiom
/// used across the workspace's other component configs.
pub struct CircuitBreakerConfigBuilder {
    name: String,
    failure_threshold: u32,
    failure_rate_threshold: f64,
    slow_call_rate_threshold: f64,
    slow_call_threshold: Duration,
    sliding_window_size: usize,
    minimum_number_of_calls: usize,
    reset_timeout: Duration,
    permitted_calls_in_half_open: usize,
    recovery_fraction: f64,
    pattern_staleness: Duration,
    failure_classifier: Arc<dyn FailureClassifier>,
    event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure_threshold: 5,
            failure_rate_threshold: 0.5,
            slow_call_rate_threshold: 1.0,
            slow_call_threshold: Duration::from_secs(10),
            sliding_window_size: 20,
            minimum_number_of_calls: 5,
            reset_timeout: Duration::from_secs(30),
            permitted_calls_in_half_open: 1,
            recovery_fraction: 0.5,
            pattern_staleness: Duration::from_secs(300),
            failure_classifier: Arc::new(DefaultClassifier),
            event_listeners: EventListeners::new(),
        }
    }

    /// Consecutive-failure count at or above which a CLOSED circuit opens.
    ///
    /// Default: 5
    pub fn failure_threshold(mut self, n: u32) -> Self {
        self.failure_threshold = n;
        self
    }

    /// Failure rate (0.0-1.0) over the window at or above which a CLOSED
    /// circuit opens.
    ///
    /// Default: 0.5
    pub fn failure_rate_threshold(mut self, rate: f64) -> Self {
        self.failure_rate_threshold = rate;
        self
    }

    /// Slow-call rate (0.0-1.0) over the window at or above which a CLOSED
    /// circuit opens.
    ///
    /// Default: 1.0 (effectively disabled)
    pub fn slow_call_rate_threshold(mut self, rate: f64) -> Self {
        self.slow_call_rate_threshold = rate;
        self
    }

    /// Duration above which a call is considered slow.
    ///
    /// Default: 10s
    pub fn slow_call_threshold(mut self, duration: Duration) -> Self {
        self.slow_call_threshold = duration;
        self
    }

    /// Size of the count-based sliding window of recent call results.
    ///
    /// Default: 20
    pub fn sliding_window_size(mut self, size: usize) -> Self {
        self.sliding_window_size = size;
        self
    }

    /// Minimum number of calls in the window before it is evaluated for a
    /// CLOSED -> OPEN transition.
    ///
    /// Default: 5
    pub fn minimum_number_of_calls(mut self, n: usize) -> Self {
        self.minimum_number_of_calls = n;
        self
    }

    /// Base reset timeout before an OPEN circuit admits a HALF_OPEN probe.
    /// Scaled at runtime by the dominant failure pattern.
    ///
    /// Default: 30s
    pub fn reset_timeout(mut self, duration: Duration) -> Self {
        self.reset_timeout = duration;
        self
    }

    /// Maximum concurrent probe calls admitted while HALF_OPEN.
    ///
    /// Default: 1
    pub fn permitted_calls_in_half_open(mut self, n: usize) -> Self {
        self.permitted_calls_in_half_open = n;
        self
    }

    /// Success rate over the HALF_OPEN window required to transition back
    /// to CLOSED.
    ///
    /// Default: 0.5
    pub fn recovery_fraction(mut self, fraction: f64) -> Self {
        self.recovery_fraction = fraction;
        self
    }

    /// Age beyond which a failure pattern is pruned on a CLOSED transition.
    ///
    /// Default: 5 minutes
    pub fn pattern_staleness(mut self, duration: Duration) -> Self {
        self.pattern_staleness = duration;
        self
    }

    /// Overrides which outcomes count as failures.
    ///
    /// Default: any `Err` counts.
    pub fn failure_classifier<C>(mut self, classifier: C) -> Self
    where
        C: FailureClassifier + 'static,
    {
        self.failure_classifier = Arc::new(classifier);
        self
    }

    /// Registers a callback for state transition events.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(crate::circuit::CircuitState, crate::circuit::CircuitState, &str) + Send + Sync + 'static,
    {
        use llmrouter_core::FnListener;
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::StateTransition {
                    from_state,
                    to_state,
                    reason,
                    ..
                } = event
                {
                    f(*from_state, *to_state, reason);
                }
            }));
        self
    }

    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            name: self.name,
            failure_threshold: self.failure_threshold,
            failure_rate_threshold: self.failure_rate_threshold,
            slow_call_rate_threshold: self.slow_call_rate_threshold,
            slow_call_threshold: self.slow_call_threshold,
            sliding_window_size: self.sliding_window_size,
            minimum_number_of_calls: self.minimum_number_of_calls.max(5),
            reset_timeout: self.reset_timeout,
            permitted_calls_in_half_open: self.permitted_calls_in_half_open,
            recovery_fraction: self.recovery_fraction,
            pattern_staleness: self.pattern_staleness,
            failure_classifier: self.failure_classifier,
            event_listeners: self.event_listeners,
        }
    }
}
