//! Request pipeline: validation, cache lookup, preprocessing, routing, and
//! usage recording, behind a single whole-pipeline deadline (C7).
//!
//! The stage order is fixed: [`validate::validate`] first, then the
//! pre-task hook, then the cache lookup. Preprocessing only runs on a
//! cache miss, inside the closure handed to
//! [`llmrouter_cache::ResponseCache::get_or_build`], so a cached response
//! never pays for compression or summarisation twice and the cache key
//! itself is computed from the untouched request.

mod hooks;
mod preprocess;
mod validate;

pub use hooks::{NoopHooks, PostTaskHook, PreTaskHook};
pub use preprocess::estimate_tokens;

use llmrouter_cache::ResponseCache;
use llmrouter_core::{Fingerprint, Request, RouterError};
use llmrouter_ledger::{LedgerEntry, UsageLedger};
use llmrouter_router::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Hard upper bound on the whole-pipeline deadline regardless of what the
/// caller or the configuration ask for.
pub const ABSOLUTE_DEADLINE_CEILING: Duration = Duration::from_secs(300);

/// Tunables that aren't backend- or router-specific.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Estimated token count above which preprocessing kicks in.
    pub compression_threshold_tokens: usize,
    /// Configured ceiling on the whole-pipeline deadline; still clamped
    /// against [`ABSOLUTE_DEADLINE_CEILING`].
    pub ceiling_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compression_threshold_tokens: 2_000,
            ceiling_timeout: ABSOLUTE_DEADLINE_CEILING,
        }
    }
}

/// Wires the cache, router, and ledger together behind the fixed stage
/// order described in the module docs.
pub struct Pipeline {
    cache: Arc<ResponseCache>,
    router: Arc<Router>,
    ledger: Arc<UsageLedger>,
    pre_hook: Arc<dyn PreTaskHook>,
    post_hook: Arc<dyn PostTaskHook>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(cache: Arc<ResponseCache>, router: Arc<Router>, ledger: Arc<UsageLedger>, config: PipelineConfig) -> Self {
        Self {
            cache,
            router,
            ledger,
            pre_hook: Arc::new(NoopHooks),
            post_hook: Arc::new(NoopHooks),
            config,
        }
    }

    pub fn with_hooks(mut self, pre: Arc<dyn PreTaskHook>, post: Arc<dyn PostTaskHook>) -> Self {
        self.pre_hook = pre;
        self.post_hook = post;
        self
    }

    /// Runs one request through the full pipeline.
    pub async fn process(&self, request: Request) -> Result<llmrouter_core::Response, RouterError> {
        validate::validate(&request)?;
        self.pre_hook.before_dispatch(&request)?;

        let deadline = self.whole_pipeline_deadline(&request);
        let deadline_at = Instant::now() + deadline;

        let fingerprint = Fingerprint::of(&request.prompt, &request.files, &request.options);
        let bypass_cache = request.options.bypass_cache;
        let skip_preprocessing = request.options.bypass_optimization || request.metadata.raw;
        let threshold = self.config.compression_threshold_tokens;

        let router = Arc::clone(&self.router);
        let build_request = request.clone();

        let response = self
            .cache
            .get_or_build(fingerprint, bypass_cache, || async move {
                let remaining = deadline_at.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(RouterError::RequestTimeout {
                        elapsed: deadline,
                        deadline,
                    });
                }

                let (dispatch_request, compression_ratio) = if skip_preprocessing {
                    (build_request.clone(), None)
                } else {
                    let (prompt, ratio) = preprocess::preprocess(&build_request.prompt, threshold);
                    let mut dispatch_request = build_request.clone();
                    dispatch_request.prompt = prompt;
                    (dispatch_request, ratio)
                };

                let mut response = router.dispatch(&dispatch_request, deadline_at).await?;
                response.compression_ratio = compression_ratio;
                Ok(response)
            })
            .await?;

        self.ledger.record(LedgerEntry {
            timestamp: std::time::SystemTime::now(),
            backend: response.backend_used.clone(),
            fingerprint,
            tokens_input: response.tokens_input,
            tokens_output: response.tokens_output,
            cost: response.cost,
            cache_hit: response.cache_hit,
            latency_ms: response.latency_ms,
        });

        self.post_hook.after_dispatch(&request, &response);
        Ok(response)
    }

    fn whole_pipeline_deadline(&self, request: &Request) -> Duration {
        let mut deadline = self.config.ceiling_timeout.min(ABSOLUTE_DEADLINE_CEILING);
        if let Some(user_timeout) = request.options.timeout {
            deadline = deadline.min(user_timeout);
        }
        deadline
    }
}
