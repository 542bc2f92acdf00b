//! Input validation, the pipeline's first gate.

use llmrouter_core::{Request, RouterError};

const MAX_PROMPT_CHARS: usize = 200_000;
const MAX_FILES: usize = 64;

/// Rejects an empty or oversize prompt, too many files, a file entry that
/// looks like a path-traversal attempt, or an out-of-range option, before
/// the request touches the cache or the router.
pub fn validate(request: &Request) -> Result<(), RouterError> {
    if request.prompt.trim().is_empty() {
        return Err(RouterError::InvalidInput("prompt is empty".to_string()));
    }
    if request.prompt.len() > MAX_PROMPT_CHARS {
        return Err(RouterError::InvalidInput(format!(
            "prompt of {} chars exceeds the {MAX_PROMPT_CHARS} char cap",
            request.prompt.len()
        )));
    }
    if request.files.len() > MAX_FILES {
        return Err(RouterError::InvalidInput(format!(
            "{} files exceeds the {MAX_FILES} file cap",
            request.files.len()
        )));
    }
    for file in &request.files {
        if looks_like_traversal(file) {
            return Err(RouterError::Security(format!(
                "file entry `{file}` looks like a path traversal attempt"
            )));
        }
    }

    if let Some(temperature) = request.options.temperature {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(RouterError::InvalidInput(format!(
                "temperature {temperature} outside the 0.0..=1.0 range"
            )));
        }
    }
    if let Some(max_tokens) = request.options.max_tokens {
        if max_tokens == 0 {
            return Err(RouterError::InvalidInput("max_tokens must be greater than zero".to_string()));
        }
    }
    if let Some(timeout) = request.options.timeout {
        if timeout.is_zero() {
            return Err(RouterError::InvalidInput("timeout must be greater than zero".to_string()));
        }
    }

    Ok(())
}

fn looks_like_traversal(entry: &str) -> bool {
    entry.contains("..") || entry.starts_with('/') || entry.starts_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::{RequestMetadata, RequestOptions};

    fn request(prompt: &str, files: Vec<String>) -> Request {
        Request {
            prompt: prompt.to_string(),
            files,
            options: RequestOptions::default(),
            metadata: RequestMetadata::new(false),
        }
    }

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(validate(&request("   ", vec![])).is_err());
    }

    #[test]
    fn traversal_attempt_is_a_security_error() {
        let err = validate(&request("hi", vec!["../../etc/passwd".to_string()])).unwrap_err();
        assert!(err.is_security());
    }

    #[test]
    fn ordinary_request_passes() {
        assert!(validate(&request("hi", vec!["notes.txt".to_string()])).is_ok());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut req = request("hi", vec![]);
        req.options.temperature = Some(1.5);
        assert!(validate(&req).is_err());
    }
}
