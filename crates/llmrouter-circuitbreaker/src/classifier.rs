//! Failure classification for circuit breaker admission decisions.
//!
//! This is distinct from [`crate::pattern::FailureKind`]: this module decides
//! *whether* an outcome counts as a failure at all; the pattern module then
//! classifies *why* a failure happened once it's been counted as one.

use llmrouter_core::RouterError;
use std::sync::Arc;

/// Determines whether a backend call outcome should count as a failure.
pub trait FailureClassifier: Send + Sync {
    /// Returns `true` if `outcome` should be counted as a failure.
    fn is_failure(&self, outcome: &Result<(), RouterError>) -> bool;
}

/// Default classifier: any `Err` is a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl FailureClassifier for DefaultClassifier {
    fn is_failure(&self, outcome: &Result<(), RouterError>) -> bool {
        outcome.is_err()
    }
}

/// A classifier backed by a closure, for callers who want to exempt some
/// error kinds (e.g. `ContextTooLarge`, which is a caller problem, not a
/// backend health problem) from counting against the breaker.
#[derive(Clone)]
pub struct FnClassifier<F> {
    f: Arc<F>,
}

impl<F> FnClassifier<F>
where
    F: Fn(&Result<(), RouterError>) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

impl<F> FailureClassifier for FnClassifier<F>
where
    F: Fn(&Result<(), RouterError>) -> bool + Send + Sync,
{
    fn is_failure(&self, outcome: &Result<(), RouterError>) -> bool {
        (self.f)(outcome)
    }
}

impl<F> std::fmt::Debug for FnClassifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnClassifier").field("f", &"<closure>").finish()
    }
}
