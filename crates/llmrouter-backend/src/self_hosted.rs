//! Adaptor for a self-hosted model server exposing a bare prompt/completion
//! endpoint (the shape typical of locally-run inference servers, as opposed
//! to the chat-message array the hosted adaptors speak).

use crate::latency::LatencyTracker;
use crate::Backend;
use llmrouter_core::{BackendDescriptor, Request, Response, RouterError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct CompletionRequestBody<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionResponseBody {
    text: String,
    #[serde(default)]
    tokens_evaluated: u32,
    #[serde(default)]
    tokens_predicted: u32,
}

/// A model server the caller operates themselves, reached over plain HTTP.
pub struct SelfHostedAdaptor {
    descriptor: BackendDescriptor,
    client: reqwest::Client,
    latency: LatencyTracker,
}

impl SelfHostedAdaptor {
    pub fn new(descriptor: BackendDescriptor) -> Self {
        let default_ms = descriptor.default_timeout.as_millis() as f64;
        Self {
            descriptor,
            client: reqwest::Client::new(),
            latency: LatencyTracker::new(default_ms),
        }
    }
}

#[async_trait::async_trait]
impl Backend for SelfHostedAdaptor {
    fn available(&self) -> bool {
        self.descriptor.enabled && self.validate_config()
    }

    fn estimate_cost(&self, _expected_tokens: u32) -> f64 {
        self.descriptor.cost_per_output_token
    }

    fn latency_score(&self) -> f64 {
        self.latency.mean()
    }

    async fn send(
        &self,
        request: &Request,
        deadline: Duration,
    ) -> Result<Response, RouterError> {
        let name = &self.descriptor.name;
        let Some(endpoint) = self.descriptor.endpoint.as_ref() else {
            return Err(RouterError::ConfigurationError(format!(
                "backend `{name}` has no endpoint configured"
            )));
        };
        let body = CompletionRequestBody {
            prompt: &request.prompt,
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
        };

        let timeout = deadline.min(self.descriptor.default_timeout);
        let started = Instant::now();

        let result = self
            .client
            .post(endpoint.clone())
            .timeout(timeout)
            .json(&body)
            .send()
            .await;

        let elapsed = started.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return Err(RouterError::BackendTimeout {
                    backend: name.clone(),
                    elapsed,
                });
            }
            Err(err) => {
                return Err(RouterError::BackendTransient {
                    backend: name.clone(),
                    reason: err.to_string(),
                });
            }
        };

        let status = response.status();
        if status.is_server_error() {
            return Err(RouterError::BackendTransient {
                backend: name.clone(),
                reason: format!("http {status}"),
            });
        }
        if status.is_client_error() {
            return Err(RouterError::InvalidInput(format!(
                "backend `{name}` rejected the request: http {status}"
            )));
        }

        let parsed: CompletionResponseBody = response.json().await.map_err(|err| {
            RouterError::BackendTransient {
                backend: name.clone(),
                reason: format!("malformed response body: {err}"),
            }
        })?;

        self.latency.record(elapsed.as_millis() as f64);

        Ok(Response {
            content: parsed.text,
            backend_used: name.clone(),
            tokens_input: parsed.tokens_evaluated,
            tokens_output: parsed.tokens_predicted,
            cost: self.estimate_cost(parsed.tokens_predicted),
            latency_ms: elapsed.as_millis() as u64,
            cache_hit: false,
            compression_ratio: None,
            backend_metadata: serde_json::Value::Null,
        })
    }

    fn validate_config(&self) -> bool {
        self.descriptor.endpoint.is_some()
    }

    fn info(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::BackendKind;

    fn descriptor() -> BackendDescriptor {
        BackendDescriptor {
            name: "local-model".to_string(),
            kind: BackendKind::SelfHosted,
            priority: 3,
            cost_per_output_token: 0.0,
            endpoint: Some("http://127.0.0.1:8081/completion".parse().unwrap()),
            model: None,
            default_timeout: Duration::from_secs(60),
            enabled: true,
        }
    }

    #[test]
    fn cost_is_flat_regardless_of_token_count() {
        let adaptor = SelfHostedAdaptor::new(descriptor());
        assert_eq!(adaptor.estimate_cost(10), adaptor.estimate_cost(10_000));
    }

    #[test]
    fn validate_config_requires_an_endpoint() {
        let mut no_endpoint = descriptor();
        no_endpoint.endpoint = None;
        let adaptor = SelfHostedAdaptor::new(no_endpoint);
        assert!(!adaptor.validate_config());
    }
}
