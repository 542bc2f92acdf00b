//! Adaptor for a generic hosted chat-completions API (the shape shared by
//! most cloud chat providers: a `messages` array in, a single `choices[0]`
//! message out).

use crate::latency::LatencyTracker;
use crate::Backend;
use llmrouter_core::{BackendDescriptor, Request, Response, RouterError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponseBody {
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

/// A hosted chat-completions backend reached over HTTPS.
pub struct HostedChatAdaptor {
    descriptor: BackendDescriptor,
    client: reqwest::Client,
    api_key: String,
    latency: LatencyTracker,
}

impl HostedChatAdaptor {
    pub fn new(descriptor: BackendDescriptor, api_key: String) -> Self {
        let default_ms = descriptor.default_timeout.as_millis() as f64;
        Self {
            descriptor,
            client: reqwest::Client::new(),
            api_key,
            latency: LatencyTracker::new(default_ms),
        }
    }

    fn system_prompt_as_message<'a>(request: &'a Request) -> ChatMessage<'a> {
        ChatMessage {
            role: "user",
            content: &request.prompt,
        }
    }
}

#[async_trait::async_trait]
impl Backend for HostedChatAdaptor {
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
        let Some(endpoint) = self.descriptor.endpoint.as_ref() else {
            return Err(RouterError::ConfigurationError(format!(
                "backend `{name}` has no endpoint configured"
            )));
        };
        let model = self.descriptor.model.as_deref().unwrap_or("default");
        let body = ChatRequestBody {
            model,
            messages: vec![Self::system_prompt_as_message(request)],
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
        };

        let timeout = deadline.min(self.descriptor.default_timeout);
        let started = Instant::now();

        let result = self
            .client
            .post(endpoint.clone())
            .bearer_auth(&self.api_key)
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
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(RouterError::AuthenticationError {
                backend: name.clone(),
                reason: format!("http {status}"),
            });
        }
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(RouterError::RateLimited {
                backend: name.clone(),
                reason: "http 429".to_string(),
                retry_after,
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

        let parsed: ChatResponseBody = response.json().await.map_err(|err| {
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
        self.descriptor.endpoint.is_some() && !self.api_key.is_empty()
    }

    fn info(&self) -> BackendDescriptor {
        self.descriptor.clone()
    }
}
