//! Fingerprint-keyed response cache with TTL, eviction, and at-most-one
//! concurrent build (C5).
//!
//! [`ResponseCache::get_or_build`] is the single entry point used by the
//! request pipeline. It checks the in-memory store first; on a miss it
//! coalesces concurrent callers with identical fingerprints behind a
//! [`tokio::sync::OnceCell`] so exactly one of them actually invokes the
//! supplied `build` callback (the router dispatch), and every other caller
//! observes the same resolved response, stamped `cache_hit=true`.
//!
//! The cache never owns the router; `build` is passed in per call, which is
//! how the orchestrator breaks the cache/router reference cycle without
//! either crate depending on the other.

mod config;
mod entry;
mod eviction;
mod events;
mod store;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use events::CacheEvent;
pub use eviction::EvictionPolicy;

use llmrouter_core::{EventListeners, Fingerprint, Response, RouterError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use store::CacheStore;
use tokio::sync::{Mutex as AsyncMutex, OnceCell};

type Inflight = Arc<OnceCell<Result<Response, RouterError>>>;

/// The fingerprint-keyed response cache.
pub struct ResponseCache {
    config: CacheConfig,
    store: Mutex<CacheStore>,
    inflight: AsyncMutex<HashMap<Fingerprint, Inflight>>,
    listeners: EventListeners<CacheEvent>,
}

/// Point-in-time counters for the orchestrator's status report.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub max_size: usize,
}

impl ResponseCache {
    /// Builds an empty cache from the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let store = CacheStore::new(config.max_size, config.policy);
        Self {
            config,
            store: Mutex::new(store),
            inflight: AsyncMutex::new(HashMap::new()),
            listeners: EventListeners::new(),
        }
    }

    /// Registers an event listener for hit/miss/eviction observability.
    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: llmrouter_core::EventListener<CacheEvent> + 'static,
    {
        self.listeners.add(listener);
    }

    /// Looks up a fingerprint directly, bypassing the coalescing machinery.
    /// Used by the pipeline's explicit cache-lookup step.
    pub fn get(&self, key: Fingerprint) -> Option<Response> {
        let mut store = self.store.lock().expect("cache store mutex poisoned");
        let hit = store.get(&key);
        match &hit {
            Some(response) => self.listeners.emit(&CacheEvent::Hit {
                backend: response.backend_used.clone(),
                timestamp: Instant::now(),
            }),
            None => self.listeners.emit(&CacheEvent::Miss {
                timestamp: Instant::now(),
            }),
        }
        hit
    }

    /// Stores a response unless the request opted out via `bypass_cache`.
    pub fn set(&self, key: Fingerprint, response: Response) {
        let mut store = self.store.lock().expect("cache store mutex poisoned");
        let evicted = store.insert(key, response, self.config.ttl);
        if evicted {
            self.listeners.emit(&CacheEvent::Eviction {
                timestamp: Instant::now(),
            });
        }
    }

    /// Drops every entry, used by the CLI and by tests between scenarios.
    pub fn clear(&self) {
        self.store.lock().expect("cache store mutex poisoned").clear();
    }

    /// Point-in-time size counters.
    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock().expect("cache store mutex poisoned");
        CacheStats {
            entries: store.len(),
            max_size: self.config.max_size,
        }
    }

    /// Drops entries whose TTL has elapsed. Intended to be called from a
    /// periodic cache-maintenance background task.
    pub fn sweep_expired(&self) -> usize {
        self.store.lock().expect("cache store mutex poisoned").sweep_expired()
    }

    /// Fetches `key` from the cache, or builds it exactly once across all
    /// concurrent callers sharing that fingerprint.
    ///
    /// `bypass_cache` skips both the lookup and the coalescing: the build
    /// always runs and the result is never stored.
    pub async fn get_or_build<B, Fut>(
        &self,
        key: Fingerprint,
        bypass_cache: bool,
        build: B,
    ) -> Result<Response, RouterError>
    where
        B: FnOnce() -> Fut,
        Fut: Future<Output = Result<Response, RouterError>>,
    {
        if bypass_cache {
            return build().await;
        }

        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let cell = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key).or_insert_with(|| Arc::new(OnceCell::new())))
        };

        let i_am_builder = Arc::new(AtomicBool::new(false));
        let builder_flag = Arc::clone(&i_am_builder);

        let result = cell
            .get_or_init(|| async move {
                builder_flag.store(true, Ordering::SeqCst);
                build().await
            })
            .await
            .clone();

        if i_am_builder.load(Ordering::SeqCst) {
            self.inflight.lock().await.remove(&key);
            if let Ok(response) = &result {
                self.set(key, response.clone());
            }
            result
        } else {
            result.map(|mut response| {
                response.cache_hit = true;
                response
            })
        }
    }
}
