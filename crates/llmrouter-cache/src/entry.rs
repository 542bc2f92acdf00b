//! Cached entries.

use llmrouter_core::Response;
use std::time::{Duration, Instant};

/// One stored response plus the bookkeeping the eviction policies need.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub(crate) response: Response,
    pub(crate) created_at: Instant,
    pub(crate) ttl: Duration,
    pub(crate) access_count: u64,
    pub(crate) last_access: Instant,
    pub(crate) size_estimate: usize,
}

impl CacheEntry {
    pub(crate) fn new(response: Response, ttl: Duration, size_estimate: usize) -> Self {
        let now = Instant::now();
        Self {
            response,
            created_at: now,
            ttl,
            access_count: 0,
            last_access: now,
            size_estimate,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Returns a defensive copy of the stored response, stamped as a cache
    /// hit, and bumps the access bookkeeping used by LFU/adaptive eviction.
    pub(crate) fn touch(&mut self) -> Response {
        self.access_count += 1;
        self.last_access = Instant::now();
        let mut response = self.response.clone();
        response.cache_hit = true;
        response
    }
}
