//! Response cache configuration.

use crate::eviction::EvictionPolicy;
use std::time::Duration;

/// Tunables for [`crate::ResponseCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction kicks in.
    pub max_size: usize,
    /// Default time-to-live for a stored entry.
    pub ttl: Duration,
    /// Policy applied to pick an eviction victim on admit-overflow.
    pub policy: EvictionPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(300),
            policy: EvictionPolicy::Lru,
        }
    }
}

impl CacheConfig {
    /// Starts a builder seeded with the defaults above.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Chained-method builder for [`CacheConfig`].
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Sets the maximum number of entries.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size.max(1);
        self
    }

    /// Sets the default entry TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = ttl;
        self
    }

    /// Sets the eviction policy.
    pub fn policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Finalises the configuration.
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = CacheConfig::builder()
            .max_size(10)
            .policy(EvictionPolicy::Adaptive)
            .build();
        assert_eq!(config.max_size, 10);
        assert_eq!(config.policy, EvictionPolicy::Adaptive);
    }
}
