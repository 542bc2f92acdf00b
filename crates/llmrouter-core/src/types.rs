//! Domain types shared across the routing subsystem.
//!
//! These are the nouns every component crate passes around: the inbound
//! [`Request`] and outbound [`Response`], the static [`BackendDescriptor`]
//! built once at startup, and the [`HealthSample`] the health monitor
//! produces and the router consumes.

use std::time::{Duration, Instant, SystemTime};

use url::Url;
use uuid::Uuid;

/// How a backend is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// A hosted, third-party completion service.
    Cloud,
    /// A model server the caller operates themselves.
    SelfHosted,
}

/// Static description of one backend, built once at orchestrator
/// initialisation and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    /// Stable identifier, used as the key everywhere (breaker, cache affinity,
    /// ledger rows, CLI `--backend` flag).
    pub name: String,
    /// Cloud or self-hosted.
    pub kind: BackendKind,
    /// Lower is preferred; used as the scoring tie-break.
    pub priority: u32,
    /// Used by `estimate_cost`.
    pub cost_per_output_token: f64,
    /// Absent for adaptors that don't need one (e.g. the mock).
    pub endpoint: Option<Url>,
    /// Model identifier to request from the backend, if applicable.
    pub model: Option<String>,
    /// Timeout applied to a single attempt against this backend.
    pub default_timeout: Duration,
    /// Disabled backends are never selected and never probed.
    pub enabled: bool,
}

/// Per-request options recognised by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Force selection of a specific backend by name, skipping scoring.
    pub backend: Option<String>,
    /// Upper bound on output tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature, clamped to 0.0..=1.0.
    pub temperature: Option<f32>,
    /// Model override, passed through to the chosen adaptor.
    pub model: Option<String>,
    /// Skip the response cache entirely for this request.
    pub bypass_cache: bool,
    /// Skip preprocessing (compression/summarisation) and go straight to
    /// the designated adaptor.
    pub bypass_optimization: bool,
    /// Caller-supplied timeout; clamped against the configured ceiling.
    pub timeout: Option<Duration>,
}

/// Synthetic metadata attached to every accepted request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Unique id for tracing this request through logs and the ledger.
    pub request_id: Uuid,
    /// When the pipeline accepted the request.
    pub received_at: SystemTime,
    /// True if `bypass_optimization` short-circuited the pipeline.
    pub raw: bool,
}

impl RequestMetadata {
    /// Stamps a fresh request with a new id and the current time.
    pub fn new(raw: bool) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            received_at: SystemTime::now(),
            raw,
        }
    }
}

/// An accepted, immutable completion request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Non-empty, size-bounded prompt text.
    pub prompt: String,
    /// Opaque file-context entries; never path-like references to be
    /// resolved by this crate.
    pub files: Vec<String>,
    /// Recognised options.
    pub options: RequestOptions,
    /// Synthetic bookkeeping fields.
    pub metadata: RequestMetadata,
}

/// The canonical outbound response every adaptor normalises into.
#[derive(Debug, Clone)]
pub struct Response {
    /// Completion text.
    pub content: String,
    /// Name of the backend that actually produced this response.
    pub backend_used: String,
    /// Prompt tokens, as reported or estimated by the backend.
    pub tokens_input: u32,
    /// Completion tokens, as reported or estimated by the backend.
    pub tokens_output: u32,
    /// Cost in the single accounting currency used throughout the ledger.
    pub cost: f64,
    /// Wall-clock time the winning attempt took.
    pub latency_ms: u64,
    /// True if this response came from the cache rather than a live call.
    pub cache_hit: bool,
    /// Ratio of preprocessed to original prompt size, if preprocessing ran.
    pub compression_ratio: Option<f64>,
    /// Backend-specific extra fields, passed through opaquely.
    pub backend_metadata: serde_json::Value,
}

/// One liveness measurement for a backend.
#[derive(Debug, Clone)]
pub struct HealthSample {
    /// Backend this sample describes.
    pub backend: String,
    /// Whether the probe considered the backend usable.
    pub healthy: bool,
    /// How long the probe took.
    pub latency: Duration,
    /// When the probe ran.
    pub timestamp: Instant,
    /// Human-readable reason, populated on failure.
    pub reason: Option<String>,
}

/// Deterministic hash over the parts of a request that influence its
/// output, used as the cache and ledger key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Computes the fingerprint of a request: the normalised prompt, the
    /// file list, and only the options that affect output (`max_tokens`,
    /// `temperature`, `model`, a backend override). `bypass_cache` and
    /// `bypass_optimization` never affect the fingerprint.
    pub fn of(prompt: &str, files: &[String], options: &RequestOptions) -> Self {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();

        normalize_prompt(prompt).hash(&mut hasher);
        files.len().hash(&mut hasher);
        for f in files {
            f.hash(&mut hasher);
        }
        options.backend.hash(&mut hasher);
        options.max_tokens.hash(&mut hasher);
        options.temperature.map(|t| t.to_bits()).hash(&mut hasher);
        options.model.hash(&mut hasher);

        Fingerprint(hasher.finish())
    }

    /// Renders the fingerprint as a fixed-width hex string, the form used
    /// for ledger rows and durable cache keys.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Collapses incidental whitespace differences so that `"2+2?"` and
/// `"  2+2?  "` fingerprint identically.
fn normalize_prompt(prompt: &str) -> String {
    prompt.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_whitespace_differences() {
        let opts = RequestOptions::default();
        let a = Fingerprint::of("2+2?", &[], &opts);
        let b = Fingerprint::of("  2+2?  ", &[], &opts);
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_ignores_cache_bypass_flags() {
        let mut opts_a = RequestOptions::default();
        opts_a.bypass_cache = false;
        let mut opts_b = RequestOptions::default();
        opts_b.bypass_cache = true;

        assert_eq!(
            Fingerprint::of("hello", &[], &opts_a),
            Fingerprint::of("hello", &[], &opts_b)
        );
    }

    #[test]
    fn fingerprint_differs_on_model_override() {
        let mut opts_a = RequestOptions::default();
        opts_a.model = Some("a".into());
        let mut opts_b = RequestOptions::default();
        opts_b.model = Some("b".into());

        assert_ne!(
            Fingerprint::of("hello", &[], &opts_a),
            Fingerprint::of("hello", &[], &opts_b)
        );
    }
}
