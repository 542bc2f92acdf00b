//! Orchestrator and public entry point for the routing middleware (C9).
//!
//! [`Orchestrator`] owns every component crate: the backend adaptors, the
//! circuit breaker registry, the health monitor, the response cache, the
//! usage ledger, the router, and the request pipeline built on top of
//! them. [`Orchestrator::new`] builds all of it from a validated
//! [`llmrouter_config::CanonicalConfig`]; [`Orchestrator::initialise`]
//! starts the background tasks (health probing, ledger draining) and is
//! idempotent under concurrent calls.
//!
//! ```no_run
//! # async fn run() -> Result<(), llmrouter_core::RouterError> {
//! let config = llmrouter_config::load(None, &llmrouter_config::ConfigOverrides::default())
//!     .map_err(|e| llmrouter_core::RouterError::ConfigurationError(e.to_string()))?;
//! let orchestrator = llmrouter::Orchestrator::new(config)?;
//! orchestrator.initialise().await;
//! let response = orchestrator.complete("2 + 2?", vec![], Default::default()).await?;
//! orchestrator.cleanup().await;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod build;
mod probe;
mod state;
mod status;

pub use state::BackendState;
pub use status::{BackendStatusEntry, OrchestratorStatus};

use llmrouter_cache::{CacheConfig, ResponseCache};
use llmrouter_circuitbreaker::{BreakerRegistry, CircuitBreakerConfig, CircuitState};
use llmrouter_config::{CanonicalConfig, ConfigWarning};
use llmrouter_core::{RequestMetadata, RequestOptions, Response, RouterError};
use llmrouter_health::{HealthMonitor, HealthMonitorConfig, HealthStatus};
use llmrouter_ledger::{InMemorySink, UsageLedger, DEFAULT_QUEUE_CAPACITY};
use llmrouter_pipeline::{Pipeline, PipelineConfig};
use llmrouter_router::{Router, RouterConfig};
use probe::BackendHealthProbe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Owns the whole routing stack and exposes the public, component-agnostic
/// API.
pub struct Orchestrator {
    breakers: Arc<BreakerRegistry>,
    health: Arc<HealthMonitor<BackendHealthProbe>>,
    cache: Arc<ResponseCache>,
    ledger: Arc<UsageLedger>,
    pipeline: Arc<Pipeline>,
    warnings: Vec<ConfigWarning>,
    build_warnings: Vec<String>,
    started: OnceCell<()>,
}

impl Orchestrator {
    /// Builds every component from a validated configuration. Building is
    /// synchronous and side-effect free; no network call or background
    /// task runs until [`Orchestrator::initialise`].
    pub fn new(config: CanonicalConfig) -> Result<Self, RouterError> {
        let (backends, build_warnings) = build::build_backends(&config);
        let backend_index = Arc::new(build::index_by_name(&backends));

        let mut registry = BreakerRegistry::new();
        for descriptor in backends.iter().map(|b| b.info()) {
            registry.register(CircuitBreakerConfig::builder(descriptor.name).build());
        }
        let breakers = Arc::new(registry);

        let names: Vec<String> = backend_index.keys().cloned().collect();
        let health_config = HealthMonitorConfig::default();
        let probe = BackendHealthProbe::new(Arc::clone(&backend_index), health_config.probe_timeout);
        let health = Arc::new(HealthMonitor::new(names, probe, health_config));

        let cache = Arc::new(ResponseCache::new(
            CacheConfig::builder().max_size(config.cache_max_size).ttl(config.cache_ttl).build(),
        ));
        let ledger = Arc::new(UsageLedger::new(Arc::new(InMemorySink::new()), DEFAULT_QUEUE_CAPACITY));

        let router_config = RouterConfig::builder()
            .weights(config.weight_cost, config.weight_latency, config.weight_availability)
            .fallback_enabled(config.fallback_enabled)
            .build();
        let router = Arc::new(Router::new(backends, Arc::clone(&breakers), health.clone() as Arc<dyn llmrouter_router::HealthLookup>, router_config));

        let pipeline_config = PipelineConfig {
            ceiling_timeout: config.ceiling_timeout,
            ..PipelineConfig::default()
        };
        let pipeline = Arc::new(Pipeline::new(Arc::clone(&cache), router, Arc::clone(&ledger), pipeline_config));

        Ok(Self {
            breakers,
            health,
            cache,
            ledger,
            pipeline,
            warnings: config.warnings,
            build_warnings,
            started: OnceCell::new(),
        })
    }

    /// Starts background tasks (health probing, ledger draining). Safe to
    /// call from multiple tasks concurrently: only the first call actually
    /// starts anything.
    pub async fn initialise(&self) {
        self.started
            .get_or_init(|| async {
                self.ledger.start().await;
                self.health.start().await;
            })
            .await;
    }

    /// Runs a completion request through the full pipeline.
    pub async fn complete(&self, prompt: impl Into<String>, files: Vec<String>, options: RequestOptions) -> Result<Response, RouterError> {
        let raw = options.bypass_optimization;
        let request = llmrouter_core::Request {
            prompt: prompt.into(),
            files,
            options,
            metadata: RequestMetadata::new(raw),
        };
        self.pipeline.process(request).await
    }

    /// Point-in-time status across every registered backend, plus cache
    /// and ledger counters.
    pub async fn status(&self) -> OrchestratorStatus {
        let health_snapshot = self.health.snapshot().await;
        let mut backends = Vec::new();
        for name in self.breakers.names() {
            let circuit_state = self.breakers.get(name).map(|b| b.state_sync()).unwrap_or(CircuitState::Closed);
            let state = match health_snapshot.get(name) {
                Some(HealthStatus::Healthy) => BackendState::Healthy,
                Some(HealthStatus::Unhealthy) => BackendState::Unhealthy,
                _ => BackendState::Registered,
            };
            backends.push(BackendStatusEntry {
                name: name.to_string(),
                state,
                circuit_state,
                enabled: state != BackendState::Unhealthy,
            });
        }

        OrchestratorStatus {
            backends,
            cache: self.cache.stats(),
            ledger_dropped: self.ledger.dropped_count(),
        }
    }

    /// Every warning the configuration loader or backend builder produced:
    /// disabled backends, clamped values, and dev-mode substitutions.
    pub fn config_validation_report(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(|w| match &w.backend {
                Some(backend) => format!("{backend}: {}", w.message),
                None => w.message.clone(),
            })
            .chain(self.build_warnings.iter().cloned())
            .collect()
    }

    /// Ordered shutdown: stops probing before draining the ledger, so no
    /// new health-driven state changes happen while the ledger is still
    /// flushing.
    pub async fn cleanup(&self) {
        self.health.stop().await;
        self.ledger.stop(Duration::from_secs(2)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_config::{AdaptorKind, BackendEntry, BackendKindEntry, CacheSection, ConfigFile, RouterSection, TimeoutSection};

    fn mock_only_config() -> CanonicalConfig {
        let file = ConfigFile {
            backends: vec![BackendEntry {
                name: "mock".to_string(),
                kind: BackendKindEntry::SelfHosted,
                priority: 0,
                cost_per_output_token: 0.0,
                endpoint: None,
                model: None,
                api_key_env: None,
                adaptor: AdaptorKind::Mock,
                default_timeout_ms: 1_000,
                enabled: true,
            }],
            cache: CacheSection { max_size: 10, ttl_secs: 60 },
            router: RouterSection::default(),
            timeouts: TimeoutSection::default(),
            dev_mode: false,
        };
        llmrouter_config::canonicalize(file)
    }

    #[tokio::test]
    async fn completes_a_request_end_to_end() {
        let orchestrator = Orchestrator::new(mock_only_config()).unwrap();
        orchestrator.initialise().await;

        let response = orchestrator.complete("hello", vec![], RequestOptions::default()).await.unwrap();
        assert_eq!(response.backend_used, "mock");

        let status = orchestrator.status().await;
        assert_eq!(status.backends.len(), 1);

        orchestrator.cleanup().await;
    }
}
