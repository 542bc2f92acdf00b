//! Validation, auto-disabling, and boundary clamping that produces the
//! canonical configuration the orchestrator builds adaptors from.

use crate::env;
use crate::file::{AdaptorKind, BackendKindEntry, ConfigFile};
use llmrouter_core::{BackendDescriptor, BackendKind};
use std::collections::HashMap;
use std::time::Duration;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MIN_CACHE_TTL_SECS: u64 = 1;
const MAX_CACHE_TTL_SECS: u64 = 86_400;
const MIN_CACHE_SIZE: usize = 1;
const MAX_CACHE_SIZE: usize = 1_000_000;

/// One thing the validator noticed and corrected or disabled.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub backend: Option<String>,
    pub message: String,
}

/// Canonicalised, validated configuration ready for the orchestrator.
#[derive(Debug, Clone)]
pub struct CanonicalConfig {
    pub backends: Vec<BackendDescriptor>,
    pub backend_credentials: HashMap<String, String>,
    pub backend_adaptors: HashMap<String, AdaptorKind>,
    pub cache_max_size: usize,
    pub cache_ttl: Duration,
    pub weight_cost: f64,
    pub weight_latency: f64,
    pub weight_availability: f64,
    pub fallback_enabled: bool,
    pub request_timeout: Duration,
    pub ceiling_timeout: Duration,
    pub dev_mode: bool,
    pub warnings: Vec<ConfigWarning>,
}

fn clamp_u64(value: u64, min: u64, max: u64, label: &str, warnings: &mut Vec<ConfigWarning>, backend: Option<&str>) -> u64 {
    if value < min || value > max {
        let clamped = value.clamp(min, max);
        warnings.push(ConfigWarning {
            backend: backend.map(str::to_string),
            message: format!("{label} {value} out of range [{min}, {max}], clamped to {clamped}"),
        });
        clamped
    } else {
        value
    }
}

fn clamp_usize(value: usize, min: usize, max: usize, label: &str, warnings: &mut Vec<ConfigWarning>) -> usize {
    if value < min || value > max {
        let clamped = value.clamp(min, max);
        warnings.push(ConfigWarning {
            backend: None,
            message: format!("{label} {value} out of range [{min}, {max}], clamped to {clamped}"),
        });
        clamped
    } else {
        value
    }
}

/// Validates and canonicalises a merged [`ConfigFile`].
pub fn canonicalize(file: ConfigFile) -> CanonicalConfig {
    let mut warnings = Vec::new();
    let mut backends = Vec::new();
    let mut backend_credentials = HashMap::new();
    let mut backend_adaptors = HashMap::new();

    for entry in file.backends {
        let mut enabled = entry.enabled;
        let credential = env::api_key_for(&entry.name, entry.api_key_env.as_deref());
        backend_adaptors.insert(entry.name.clone(), entry.adaptor);

        let credential_required = matches!(entry.adaptor, AdaptorKind::Hosted);
        if credential_required && credential.is_none() {
            enabled = false;
            warnings.push(ConfigWarning {
                backend: Some(entry.name.clone()),
                message: "no credential found, backend disabled".to_string(),
            });
        }

        let endpoint = match entry.endpoint.as_deref().map(str::parse::<url::Url>) {
            Some(Ok(url)) => Some(url),
            Some(Err(err)) => {
                enabled = false;
                warnings.push(ConfigWarning {
                    backend: Some(entry.name.clone()),
                    message: format!("malformed endpoint URL: {err}, backend disabled"),
                });
                None
            }
            None => None,
        };

        let timeout_ms = clamp_u64(
            entry.default_timeout_ms,
            MIN_TIMEOUT_MS,
            MAX_TIMEOUT_MS,
            "default_timeout_ms",
            &mut warnings,
            Some(&entry.name),
        );

        if let Some(credential) = credential {
            backend_credentials.insert(entry.name.clone(), credential);
        }

        backends.push(BackendDescriptor {
            name: entry.name,
            kind: match entry.kind {
                BackendKindEntry::Cloud => BackendKind::Cloud,
                BackendKindEntry::SelfHosted => BackendKind::SelfHosted,
            },
            priority: entry.priority,
            cost_per_output_token: entry.cost_per_output_token,
            endpoint,
            model: entry.model,
            default_timeout: Duration::from_millis(timeout_ms),
            enabled,
        });
    }

    let cache_max_size = clamp_usize(file.cache.max_size, MIN_CACHE_SIZE, MAX_CACHE_SIZE, "cache.max_size", &mut warnings);
    let cache_ttl_secs = clamp_u64(
        file.cache.ttl_secs,
        MIN_CACHE_TTL_SECS,
        MAX_CACHE_TTL_SECS,
        "cache.ttl_secs",
        &mut warnings,
        None,
    );
    let request_timeout_ms = clamp_u64(
        file.timeouts.request_timeout_ms,
        MIN_TIMEOUT_MS,
        MAX_TIMEOUT_MS,
        "timeouts.request_timeout_ms",
        &mut warnings,
        None,
    );
    let ceiling_timeout_ms = clamp_u64(
        file.timeouts.ceiling_timeout_ms,
        MIN_TIMEOUT_MS,
        MAX_TIMEOUT_MS,
        "timeouts.ceiling_timeout_ms",
        &mut warnings,
        None,
    );

    if file.dev_mode {
        warnings.push(ConfigWarning {
            backend: None,
            message: "dev mode enabled: the mock backend may be substituted for a real one"
                .to_string(),
        });
    }

    CanonicalConfig {
        backends,
        backend_credentials,
        backend_adaptors,
        cache_max_size,
        cache_ttl: Duration::from_secs(cache_ttl_secs),
        weight_cost: file.router.weight_cost,
        weight_latency: file.router.weight_latency,
        weight_availability: file.router.weight_availability,
        fallback_enabled: file.router.fallback_enabled,
        request_timeout: Duration::from_millis(request_timeout_ms),
        ceiling_timeout: Duration::from_millis(ceiling_timeout_ms),
        dev_mode: file.dev_mode,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::BackendEntry;

    fn cloud_backend(name: &str) -> BackendEntry {
        BackendEntry {
            name: name.to_string(),
            kind: BackendKindEntry::Cloud,
            priority: 1,
            cost_per_output_token: 0.0,
            endpoint: Some("https://api.example.com/v1".to_string()),
            model: None,
            api_key_env: None,
            adaptor: AdaptorKind::Hosted,
            default_timeout_ms: 30_000,
            enabled: true,
        }
    }

    #[test]
    fn cloud_backend_without_credential_is_disabled() {
        let mut file = ConfigFile::default();
        file.backends.push(cloud_backend("nocreds"));

        let canonical = canonicalize(file);
        assert!(!canonical.backends[0].enabled);
        assert!(canonical
            .warnings
            .iter()
            .any(|w| w.message.contains("no credential")));
    }

    #[test]
    fn malformed_endpoint_disables_backend() {
        let mut file = ConfigFile::default();
        let mut entry = cloud_backend("bad-url");
        entry.endpoint = Some("not a url".to_string());
        file.backends.push(entry);

        let canonical = canonicalize(file);
        assert!(!canonical.backends[0].enabled);
        assert!(canonical
            .warnings
            .iter()
            .any(|w| w.message.contains("malformed endpoint")));
    }

    #[test]
    fn out_of_range_timeout_is_clamped() {
        let mut file = ConfigFile::default();
        let mut entry = cloud_backend("slow");
        entry.default_timeout_ms = 10_000_000;
        file.backends.push(entry);

        let canonical = canonicalize(file);
        assert_eq!(canonical.backends[0].default_timeout, Duration::from_millis(MAX_TIMEOUT_MS));
    }
}
