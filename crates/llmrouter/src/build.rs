//! Turns a validated [`llmrouter_config::CanonicalConfig`] into concrete
//! backend adaptor instances.

use llmrouter_backend::{Backend, HostedChatAdaptor, MockAdaptor, OpenAiCompatibleAdaptor, SelfHostedAdaptor};
use llmrouter_config::{AdaptorKind, CanonicalConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Name given to the mock backend auto-enabled under dev mode when every
/// configured backend ended up disabled.
pub const DEV_FALLBACK_NAME: &str = "dev-mock";

/// Builds one adaptor per canonicalised backend entry, keyed by name.
/// If dev mode is on and nothing else is enabled, appends a single mock
/// backend and returns a warning describing the substitution — the
/// substitution must never happen silently.
pub fn build_backends(config: &CanonicalConfig) -> (Vec<Arc<dyn Backend>>, Vec<String>) {
    let mut backends: Vec<Arc<dyn Backend>> = Vec::new();
    let mut warnings = Vec::new();

    for descriptor in &config.backends {
        let adaptor_kind = config
            .backend_adaptors
            .get(&descriptor.name)
            .copied()
            .unwrap_or(AdaptorKind::Hosted);
        let credential = config.backend_credentials.get(&descriptor.name).cloned();

        let backend: Arc<dyn Backend> = match adaptor_kind {
            AdaptorKind::Hosted => Arc::new(HostedChatAdaptor::new(descriptor.clone(), credential.unwrap_or_default())),
            AdaptorKind::OpenAiCompatible => Arc::new(OpenAiCompatibleAdaptor::new(descriptor.clone(), credential)),
            AdaptorKind::SelfHosted => Arc::new(SelfHostedAdaptor::new(descriptor.clone())),
            AdaptorKind::Mock => Arc::new(MockAdaptor::new(descriptor.name.clone(), descriptor.enabled)),
        };
        backends.push(backend);
    }

    if config.dev_mode && backends.iter().all(|b| !b.available()) {
        warnings.push(format!(
            "dev mode: no enabled backend, substituting deterministic mock backend `{DEV_FALLBACK_NAME}`"
        ));
        backends.push(Arc::new(MockAdaptor::new(DEV_FALLBACK_NAME, true)));
    }

    (backends, warnings)
}

/// Indexes backends by name for the health probe and the breaker registry.
pub fn index_by_name(backends: &[Arc<dyn Backend>]) -> HashMap<String, Arc<dyn Backend>> {
    backends.iter().map(|b| (b.info().name, Arc::clone(b))).collect()
}
