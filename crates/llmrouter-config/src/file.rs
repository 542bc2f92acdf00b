//! On-disk configuration shape (TOML), the middle layer of the merge order:
//! built-in defaults -> config file -> env vars -> programmatic overrides.

use serde::Deserialize;

/// Root of `llmrouter.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub backends: Vec<BackendEntry>,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub router: RouterSection,
    #[serde(default)]
    pub timeouts: TimeoutSection,
    /// Enables the mock backend as a last resort. The orchestrator logs a
    /// warning when this flips a request onto the mock backend rather than
    /// silently substituting it.
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendEntry {
    pub name: String,
    #[serde(default)]
    pub kind: BackendKindEntry,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub cost_per_output_token: f64,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Name of the environment variable holding this backend's credential.
    /// Absent for backends that don't need one (self-hosted, mock).
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Which concrete adaptor implementation to instantiate. Distinct from
    /// `kind`: `kind` is the billing/scoring classification (cloud vs
    /// self-hosted), `adaptor` is the wire format to speak.
    #[serde(default)]
    pub adaptor: AdaptorKind,
    #[serde(default = "defaults::timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
}

/// Selects which concrete adaptor implementation a backend entry maps to.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdaptorKind {
    /// Hosted chat-completions API, messages array, bearer auth.
    #[default]
    Hosted,
    /// OpenAI-compatible API at a caller-supplied base URL.
    OpenAiCompatible,
    /// Self-hosted model server, prompt/completion wire shape.
    SelfHosted,
    /// Deterministic mock, for tests and the dev-mode last resort.
    Mock,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKindEntry {
    #[default]
    Cloud,
    SelfHosted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "defaults::cache_max_size")]
    pub max_size: usize,
    #[serde(default = "defaults::cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_size: defaults::cache_max_size(),
            ttl_secs: defaults::cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterSection {
    #[serde(default = "defaults::weight_cost")]
    pub weight_cost: f64,
    #[serde(default = "defaults::weight_latency")]
    pub weight_latency: f64,
    #[serde(default = "defaults::weight_availability")]
    pub weight_availability: f64,
    #[serde(default = "defaults::fallback_enabled")]
    pub fallback_enabled: bool,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            weight_cost: defaults::weight_cost(),
            weight_latency: defaults::weight_latency(),
            weight_availability: defaults::weight_availability(),
            fallback_enabled: defaults::fallback_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSection {
    #[serde(default = "defaults::request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "defaults::ceiling_timeout_ms")]
    pub ceiling_timeout_ms: u64,
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: defaults::request_timeout_ms(),
            ceiling_timeout_ms: defaults::ceiling_timeout_ms(),
        }
    }
}

mod defaults {
    pub fn timeout_ms() -> u64 {
        30_000
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn cache_max_size() -> usize {
        1000
    }
    pub fn cache_ttl_secs() -> u64 {
        300
    }
    pub fn weight_cost() -> f64 {
        0.4
    }
    pub fn weight_latency() -> f64 {
        0.4
    }
    pub fn weight_availability() -> f64 {
        0.2
    }
    pub fn fallback_enabled() -> bool {
        true
    }
    pub fn request_timeout_ms() -> u64 {
        30_000
    }
    pub fn ceiling_timeout_ms() -> u64 {
        300_000
    }
}

impl ConfigFile {
    /// Parses a TOML document into a [`ConfigFile`]. Malformed TOML is a
    /// configuration error, fatal at init.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Searches the first-existing-wins candidate paths: current working
    /// directory, then the user's home directory.
    pub fn discover(filename: &str) -> Option<std::path::PathBuf> {
        let cwd_candidate = std::path::PathBuf::from(filename);
        if cwd_candidate.is_file() {
            return Some(cwd_candidate);
        }
        let home = std::env::var_os("HOME")?;
        let home_candidate = std::path::PathBuf::from(home).join(filename);
        home_candidate.is_file().then_some(home_candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_applies_defaults() {
        let file = ConfigFile::parse(
            r#"
            [[backends]]
            name = "openai"
            endpoint = "https://api.openai.com/v1/chat/completions"
            "#,
        )
        .unwrap();

        assert_eq!(file.backends.len(), 1);
        assert_eq!(file.backends[0].default_timeout_ms, 30_000);
        assert!(file.backends[0].enabled);
        assert_eq!(file.cache.max_size, 1000);
        assert_eq!(file.router.weight_cost, 0.4);
    }
}
