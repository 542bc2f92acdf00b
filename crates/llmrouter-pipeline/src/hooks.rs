//! Pre/post-task hooks, the pipeline's extension point for callers who need
//! to observe or veto a request without reaching into routing internals.

use llmrouter_core::{Request, Response, RouterError};

/// Runs immediately after validation, before the cache lookup. Returning
/// an error aborts the request before it ever reaches the cache or router.
pub trait PreTaskHook: Send + Sync {
    fn before_dispatch(&self, request: &Request) -> Result<(), RouterError>;
}

/// Runs after a response is produced, whether from the cache or a live
/// dispatch, before it's handed back to the caller.
pub trait PostTaskHook: Send + Sync {
    fn after_dispatch(&self, request: &Request, response: &Response);
}

/// The default hook pair: accepts every request and observes nothing.
pub struct NoopHooks;

impl PreTaskHook for NoopHooks {
    fn before_dispatch(&self, _request: &Request) -> Result<(), RouterError> {
        Ok(())
    }
}

impl PostTaskHook for NoopHooks {
    fn after_dispatch(&self, _request: &Request, _response: &Response) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::{RequestMetadata, RequestOptions};

    #[test]
    fn noop_hooks_accept_everything() {
        let request = Request {
            prompt: "hi".to_string(),
            files: Vec::new(),
            options: RequestOptions::default(),
            metadata: RequestMetadata::new(false),
        };
        assert!(NoopHooks.before_dispatch(&request).is_ok());
    }
}
