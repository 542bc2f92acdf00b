//! Adaptor for any service that speaks the OpenAI-compatible chat-completions
//! wire format against an alternate base URL (local proxies, third-party
//! compatible hosts). Differs from [`crate::hosted::HostedChatAdaptor`] only
//! in how the request path is built and in omitting bearer auth when no key
//! is configured, since many compatible servers don't require one.

use crate::latency::LatencyTracker;
use crate::Backend;
use llmrouter_core::{BackendDescriptor, Request, Response, RouterError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct CompletionRequestBody<'a> {
    model: &'a str,
    messages: [MessageRef<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct MessageRef<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponseBody {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Base URL + `/chat/completions`, OpenAI-compatible backend.
pub struct OpenAiCompatibleAdaptor {
    descriptor: BackendDescriptor,
    client: reqwest::Client,
    api_key: Option<String>,
    latency: LatencyTracker,
}

impl OpenAiCompatibleAdaptor {
    pub fn new(descriptor: BackendDescriptor, api_key: Option<String>) -> Self {
        let default_ms = descriptor.default_timeout.as_millis() as f64;
        Self {
            descriptor,
            client: reqwest::Client::new(),
            api_key,
            latency: LatencyTracker::new(default_ms),
        }
    }

    fn completions_url(&self) -> Option<url::Url> {
        self.descriptor.endpoint.as_ref()?.join("chat/completions").ok()
    }
}

#[async_trait::async_trait]
impl Backend for OpenAiCompatibleAdaptor {
    fn available(&self) -> bool {
        self.descriptor.enabled && self.validate_config()
    }

    fn estimate_cost(&self, expected_tokens: u32) -> f64 {
        expected_tokens as f64 * self.descriptor.cost_per_output_token
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
        let Some(url) = self.completions_url() else {
            return Err(RouterError::ConfigurationError(format!(
                "backend `{name}` has no usable base URL"
            )));
        };
        let model = self.descriptor.model.as_deref().unwrap_or("default");
        let body = CompletionRequestBody {
            model,
            messages: [MessageRef {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
        };

        let timeout = deadline.min(self.descriptor.default_timeout);
        let started = Instant::now();

        let mut builder = self.client.post(url).timeout(timeout).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let result = builder.send().await;
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
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RouterError::AuthenticationError {
                backend: name.clone(),
                reason: format!("http {status}"),
            });
        }
        if status.as_u16() == 429 {
            return Err(RouterError::RateLimited {
                backend: name.clone(),
                reason: "http 429".to_string(),
                retry_after: None,
            });
        }
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

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RouterError::BackendTransient {
                backend: name.clone(),
                reason: "response had no choices".to_string(),
            })?;

        self.latency.record(elapsed.as_millis() as f64);

        Ok(Response {
            content,
            backend_used: name.clone(),
            tokens_input: parsed.usage.prompt_tokens,
            tokens_output: parsed.usage.completion_tokens,
            cost: self.estimate_cost(parsed.usage.completion_tokens),
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
            name: "local-compat".to_string(),
            kind: BackendKind::SelfHosted,
            priority: 2,
            cost_per_output_token: 0.0,
            endpoint: Some("http://localhost:8080/v1/".parse().unwrap()),
            model: Some("llama".to_string()),
            default_timeout: Duration::from_secs(30),
            enabled: true,
        }
    }

    #[test]
    fn completions_url_joins_relative_to_base() {
        let adaptor = OpenAiCompatibleAdaptor::new(descriptor(), None);
        assert_eq!(
            adaptor.completions_url().unwrap().as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn validate_config_does_not_require_a_key() {
        let adaptor = OpenAiCompatibleAdaptor::new(descriptor(), None);
        assert!(adaptor.validate_config());
    }
}
