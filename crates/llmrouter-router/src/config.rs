//! Scoring weights and fallback policy for the router.

/// Weights applied to each component of the composite score.
/// Must not be negative; need not sum to exactly 1.0, though the defaults do.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub cost: f64,
    pub latency: f64,
    pub availability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cost: 0.4,
            latency: 0.4,
            availability: 0.2,
        }
    }
}

/// Fixed multiplier applied to the availability score while a backend's
/// circuit is HALF_OPEN: still eligible, but scored as riskier than a fully
/// CLOSED, healthy backend.
pub const HALF_OPEN_AVAILABILITY_DISCOUNT: f64 = 0.5;

/// Router-wide configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub(crate) weights: ScoringWeights,
    pub(crate) fallback_enabled: bool,
    pub(crate) default_expected_tokens: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            fallback_enabled: true,
            default_expected_tokens: 256,
        }
    }
}

impl RouterConfig {
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::new()
    }
}

/// Builder for [`RouterConfig`], matching the chained-method idiom used
/// across the workspace's other component configs.
pub struct RouterConfigBuilder {
    config: RouterConfig,
}

impl RouterConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RouterConfig::default(),
        }
    }

    /// Relative weights for cost, latency, and availability. Not required to
    /// sum to 1.0, but scores are easiest to reason about when they do.
    ///
    /// Default: (0.4, 0.4, 0.2)
    pub fn weights(mut self, cost: f64, latency: f64, availability: f64) -> Self {
        self.config.weights = ScoringWeights {
            cost,
            latency,
            availability,
        };
        self
    }

    /// Whether a retryable failure on one candidate moves on to the next
    /// rather than surfacing immediately.
    ///
    /// Default: true
    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.config.fallback_enabled = enabled;
        self
    }

    /// Output token estimate used for cost scoring when the request doesn't
    /// specify `max_tokens`.
    ///
    /// Default: 256
    pub fn default_expected_tokens(mut self, tokens: u32) -> Self {
        self.config.default_expected_tokens = tokens.max(1);
        self
    }

    pub fn build(self) -> RouterConfig {
        self.config
    }
}

impl Default for RouterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
