//! Environment-variable overlay, applied after the config file and before
//! programmatic overrides.

use crate::file::ConfigFile;

const DEV_MODE_VAR: &str = "LLMROUTER_DEV_MODE";
const TIMEOUT_CEILING_VAR: &str = "LLMROUTER_TIMEOUT_CEILING_MS";

/// Applies recognised environment variables on top of a parsed file. Per
/// spec: per-backend credentials (`<BACKEND>_API_KEY`), per-backend base
/// URL/model overrides (`<BACKEND>_BASE_URL`, `<BACKEND>_MODEL`), the global
/// timeout ceiling, and the dev-mode flag.
pub fn apply_env_overlay(mut file: ConfigFile) -> ConfigFile {
    if let Ok(value) = std::env::var(DEV_MODE_VAR) {
        file.dev_mode = is_truthy(&value);
    }
    if let Ok(value) = std::env::var(TIMEOUT_CEILING_VAR) {
        if let Ok(ms) = value.parse::<u64>() {
            file.timeouts.ceiling_timeout_ms = ms;
        }
    }

    for backend in &mut file.backends {
        let prefix = shouting_case(&backend.name);
        if let Ok(url) = std::env::var(format!("{prefix}_BASE_URL")) {
            backend.endpoint = Some(url);
        }
        if let Ok(model) = std::env::var(format!("{prefix}_MODEL")) {
            backend.model = Some(model);
        }
    }

    file
}

/// Looks up a backend's credential: the entry's explicit `api_key_env`
/// override if it named one, otherwise the derived `<BACKEND>_API_KEY`.
/// Kept separate from the overlay above because the credential itself is
/// never stored back onto the canonicalised config, only consulted during
/// validation.
pub fn api_key_for(backend_name: &str, api_key_env: Option<&str>) -> Option<String> {
    match api_key_env {
        Some(var) => std::env::var(var).ok(),
        None => std::env::var(format!("{}_API_KEY", shouting_case(backend_name))).ok(),
    }
}

fn shouting_case(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shouting_case_replaces_non_alphanumeric() {
        assert_eq!(shouting_case("my-backend"), "MY_BACKEND");
    }

    #[test]
    fn truthy_values_are_case_insensitive() {
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
