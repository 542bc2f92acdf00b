//! In-memory fingerprint-keyed store, with TTL and pluggable eviction.

use crate::entry::CacheEntry;
use crate::eviction::{select_victim, EvictionPolicy};
use llmrouter_core::{Fingerprint, Response};
use std::collections::HashMap;
use std::time::Duration;

/// The in-memory tier backing [`crate::ResponseCache`]. A durable tier, if
/// any, sits behind this one and is consulted only on a miss here.
pub(crate) struct CacheStore {
    entries: HashMap<Fingerprint, CacheEntry>,
    max_size: usize,
    policy: EvictionPolicy,
}

impl CacheStore {
    pub(crate) fn new(max_size: usize, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            max_size,
            policy,
        }
    }

    /// Returns a defensive, `cache_hit=true` copy on a fresh hit, evicting
    /// the entry first if it has expired.
    pub(crate) fn get(&mut self, key: &Fingerprint) -> Option<Response> {
        let expired = self.entries.get(key).map(CacheEntry::is_expired).unwrap_or(false);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key).map(CacheEntry::touch)
    }

    /// Inserts a response under `key`. Returns `true` if an existing entry
    /// had to be evicted to make room.
    pub(crate) fn insert(&mut self, key: Fingerprint, response: Response, ttl: Duration) -> bool {
        let size_estimate = response.content.len();
        let entry = CacheEntry::new(response, ttl, size_estimate);

        let mut evicted = false;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            if let Some(victim) = select_victim(&self.entries, self.policy) {
                self.entries.remove(&victim);
                evicted = true;
            }
        }
        self.entries.insert(key, entry);
        evicted
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every entry that has expired. Run periodically by the cache
    /// maintenance task.
    pub(crate) fn sweep_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired());
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::RequestOptions;
    use std::thread::sleep;

    fn response() -> Response {
        Response {
            content: "hi".into(),
            backend_used: "b".into(),
            tokens_input: 1,
            tokens_output: 1,
            cost: 0.0,
            latency_ms: 1,
            cache_hit: false,
            compression_ratio: None,
            backend_metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn hit_marks_cache_hit_true() {
        let mut store = CacheStore::new(10, EvictionPolicy::Lru);
        let key = Fingerprint::of("p", &[], &RequestOptions::default());
        store.insert(key, response(), Duration::from_secs(60));

        let hit = store.get(&key).unwrap();
        assert!(hit.cache_hit);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let mut store = CacheStore::new(10, EvictionPolicy::Lru);
        let key = Fingerprint::of("p", &[], &RequestOptions::default());
        store.insert(key, response(), Duration::from_millis(10));

        sleep(Duration::from_millis(30));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn overflow_evicts_one_entry() {
        let mut store = CacheStore::new(1, EvictionPolicy::Fifo);
        let a = Fingerprint::of("a", &[], &RequestOptions::default());
        let b = Fingerprint::of("b", &[], &RequestOptions::default());

        store.insert(a, response(), Duration::from_secs(60));
        let evicted = store.insert(b, response(), Duration::from_secs(60));

        assert!(evicted);
        assert_eq!(store.len(), 1);
        assert!(store.get(&a).is_none());
        assert!(store.get(&b).is_some());
    }
}
