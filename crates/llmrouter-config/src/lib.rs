//! Layered configuration loading and validation (C8).
//!
//! Merge order is built-in defaults, then an on-disk TOML file, then
//! environment variables, then programmatic overrides supplied by the
//! caller. The result is validated and canonicalised: backends missing a
//! credential or carrying a malformed endpoint are disabled rather than
//! rejected outright, and boundary values are clamped instead of failing
//! the whole load.

mod env;
mod file;
mod validate;

pub use file::{AdaptorKind, BackendEntry, BackendKindEntry, CacheSection, ConfigFile, RouterSection, TimeoutSection};
pub use validate::{canonicalize, CanonicalConfig, ConfigWarning};

const DEFAULT_FILENAME: &str = "llmrouter.toml";

/// Programmatic overrides applied last, after the file and env layers.
/// Every field is optional; `None` leaves the merged value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dev_mode: Option<bool>,
    pub ceiling_timeout_ms: Option<u64>,
}

fn apply_overrides(mut merged: ConfigFile, overrides: &ConfigOverrides) -> ConfigFile {
    if let Some(dev_mode) = overrides.dev_mode {
        merged.dev_mode = dev_mode;
    }
    if let Some(ceiling_timeout_ms) = overrides.ceiling_timeout_ms {
        merged.timeouts.ceiling_timeout_ms = ceiling_timeout_ms;
    }
    merged
}

/// Loads configuration from `path` (or the discovered default file if
/// `path` is `None`), applies the env overlay and overrides, and returns
/// the canonicalised result. A missing file is not an error: the merge
/// proceeds from built-in defaults alone.
pub fn load(
    path: Option<&std::path::Path>,
    overrides: &ConfigOverrides,
) -> Result<CanonicalConfig, ConfigError> {
    let resolved_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => ConfigFile::discover(DEFAULT_FILENAME),
    };

    let file = match resolved_path {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            ConfigFile::parse(&contents).map_err(|source| ConfigError::Parse { path, source })?
        }
        None => ConfigFile::default(),
    };

    let file = env::apply_env_overlay(file);
    let file = apply_overrides(file, overrides);
    Ok(validate::canonicalize(file))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: std::path::PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: std::path::PathBuf, source: toml::de::Error },
}
