//! Deterministic mock adaptor: used in tests and, when explicitly enabled
//! by the orchestrator under a dev-mode flag, as a last-resort backend.

use crate::Backend;
use llmrouter_core::{BackendDescriptor, BackendKind, Request, Response, RouterError};
use std::time::Duration;

/// A backend that never performs I/O and always succeeds. Deterministic so
/// it's useful for scoring and pipeline tests without a network.
pub struct MockAdaptor {
    descriptor: BackendDescriptor,
}

impl MockAdaptor {
    /// `enabled` should only be `true` when the orchestrator's dev-mode flag
    /// explicitly allows it; the caller is responsible for logging a
    /// warning when it does; substitution must never happen silently.
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            descriptor: BackendDescriptor {
                name: name.into(),
                kind: BackendKind::SelfHosted,
                priority: u32::MAX,
                cost_per_output_token: 0.0,
                endpoint: None,
                model: Some("mock".to_string()),
                default_timeout: Duration::from_millis(50),
                enabled,
            },
        }
    }
}

#[async_trait::async_trait]
impl Backend for MockAdaptor {
    fn available(&self) -> bool {
        self.descriptor.enabled
    }

    fn estimate_cost(&self, _expected_tokens: u32) -> f64 {
        0.0
    }

    fn latency_score(&self) -> f64 {
        5.0
    }

    async fn send(
        &self,
        request: &Request,
        _deadline: Duration,
    ) -> Result<Response, RouterError> {
        let tokens_input = request.prompt.split_whitespace().count() as u32;
        Ok(Response {
            content: format!("mock response to: {}", request.prompt),
            backend_used: self.descriptor.name.clone(),
            tokens_input,
            tokens_output: tokens_input,
            cost: 0.0,
            latency_ms: 1,
            cache_hit: false,
            compression_ratio: None,
            backend_metadata: serde_json::Value::Null,
        })
    }

    fn validate_config(&self) -> bool {
        true
    }

    fn info(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::request;

    #[tokio::test]
    async fn echoes_prompt_deterministically() {
        let mock = MockAdaptor::new("mock", true);
        let req = request("hello world");
        let first = mock.send(&req, Duration::from_secs(1)).await.unwrap();
        let second = mock.send(&req, Duration::from_secs(1)).await.unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first.tokens_input, 2);
    }

    #[test]
    fn disabled_until_explicitly_enabled() {
        let mock = MockAdaptor::new("mock", false);
        assert!(!mock.available());
    }
}
