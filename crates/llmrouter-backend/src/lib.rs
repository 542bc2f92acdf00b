//! Uniform adaptor contract over completion backends (C1).
//!
//! A [`Backend`] is the only thing the router knows how to talk to: it never
//! sees a provider's wire format, only `send`, `available`, `estimate_cost`,
//! `latency_score`, `validate_config` and `info`. Four variants are provided:
//! [`hosted::HostedChatAdaptor`] for a generic hosted chat-completions API,
//! [`openai_compatible::OpenAiCompatibleAdaptor`] for services that speak the
//! same JSON shape against an alternate base URL, [`self_hosted::SelfHostedAdaptor`]
//! for a model server the caller operates, and [`mock::MockAdaptor`] for tests
//! and as an explicitly-opted-in last resort.

mod hosted;
mod latency;
mod mock;
mod openai_compatible;
mod self_hosted;

pub use hosted::HostedChatAdaptor;
pub use latency::LatencyTracker;
pub use mock::MockAdaptor;
pub use openai_compatible::OpenAiCompatibleAdaptor;
pub use self_hosted::SelfHostedAdaptor;

use llmrouter_core::{BackendDescriptor, Request, Response, RouterError};

/// Contract every completion backend must implement.
///
/// Implementations normalise whatever their provider returns into a
/// canonical [`Response`]; anything that can't be mapped to the router's
/// error taxonomy should become [`RouterError::BackendTransient`] so the
/// circuit breaker's classifier still has something to work with.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Cheap, local readiness check: credentials present, config sane. Does
    /// not perform network I/O; that's the health monitor's job.
    fn available(&self) -> bool;

    /// Projected cost of a completion using `expected_tokens` output tokens.
    fn estimate_cost(&self, expected_tokens: u32) -> f64;

    /// A relative latency figure (milliseconds, lower is better) the router
    /// normalises against other candidates when scoring.
    fn latency_score(&self) -> f64;

    /// Dispatches one completion request. `deadline` is the remaining
    /// attempt budget derived from the whole-pipeline deadline; the
    /// implementation must not exceed it.
    async fn send(
        &self,
        request: &Request,
        deadline: std::time::Duration,
    ) -> Result<Response, RouterError>;

    /// Validates that this adaptor has what it needs to be considered for
    /// routing (credentials, endpoint shape). Failing this disables the
    /// backend rather than letting every request hit `send` and fail.
    fn validate_config(&self) -> bool;

    /// A snapshot of this adaptor's static descriptor.
    fn info(&self) -> BackendDescriptor;
}

#[cfg(test)]
pub(crate) mod test_support {
    use llmrouter_core::{RequestMetadata, RequestOptions};

    pub(crate) fn request(prompt: &str) -> llmrouter_core::Request {
        llmrouter_core::Request {
            prompt: prompt.to_string(),
            files: Vec::new(),
            options: RequestOptions::default(),
            metadata: RequestMetadata::new(false),
        }
    }
}
