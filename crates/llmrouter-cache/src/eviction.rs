//! Cache eviction policies.

use crate::entry::CacheEntry;
use llmrouter_core::Fingerprint;
use std::collections::HashMap;

/// Determines which entry is evicted when the cache is full and a new
/// fingerprint needs to be admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evicts the entry accessed longest ago.
    Lru,
    /// Evicts the entry with the lowest access count.
    Lfu,
    /// Evicts the oldest entry regardless of access pattern.
    Fifo,
    /// Scores every entry by `hours_since_last_access + 1/(access_count+1) +
    /// size_kb*0.1` and evicts the highest score.
    Adaptive,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::Lru
    }
}

/// Picks the fingerprint to evict under `policy`, or `None` if there is
/// nothing to evict.
pub(crate) fn select_victim(
    entries: &HashMap<Fingerprint, CacheEntry>,
    policy: EvictionPolicy,
) -> Option<Fingerprint> {
    match policy {
        EvictionPolicy::Lru => entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| *k),
        EvictionPolicy::Lfu => entries
            .iter()
            .min_by_key(|(_, e)| e.access_count)
            .map(|(k, _)| *k),
        EvictionPolicy::Fifo => entries
            .iter()
            .min_by_key(|(_, e)| e.created_at)
            .map(|(k, _)| *k),
        EvictionPolicy::Adaptive => entries
            .iter()
            .max_by(|(_, a), (_, b)| {
                adaptive_score(a)
                    .partial_cmp(&adaptive_score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(k, _)| *k),
    }
}

fn adaptive_score(entry: &CacheEntry) -> f64 {
    let hours_since_last_access = entry.last_access.elapsed().as_secs_f64() / 3600.0;
    let access_term = 1.0 / (entry.access_count as f64 + 1.0);
    let size_kb = entry.size_estimate as f64 / 1024.0;
    hours_since_last_access + access_term + size_kb * 0.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrouter_core::{Response, Fingerprint, RequestOptions};
    use std::time::Duration;

    fn entry_with(access_count: u64, size_estimate: usize) -> CacheEntry {
        let response = Response {
            content: "x".into(),
            backend_used: "b".into(),
            tokens_input: 1,
            tokens_output: 1,
            cost: 0.0,
            latency_ms: 1,
            cache_hit: false,
            compression_ratio: None,
            backend_metadata: serde_json::Value::Null,
        };
        let mut e = CacheEntry::new(response, Duration::from_secs(60), size_estimate);
        e.access_count = access_count;
        e
    }

    #[test]
    fn lfu_evicts_lowest_access_count() {
        let mut entries = HashMap::new();
        let fp_a = Fingerprint::of("a", &[], &RequestOptions::default());
        let fp_b = Fingerprint::of("b", &[], &RequestOptions::default());
        entries.insert(fp_a, entry_with(10, 100));
        entries.insert(fp_b, entry_with(1, 100));

        assert_eq!(select_victim(&entries, EvictionPolicy::Lfu), Some(fp_b));
    }

    #[test]
    fn adaptive_prefers_large_rarely_used_entries() {
        let mut entries = HashMap::new();
        let fp_small_hot = Fingerprint::of("a", &[], &RequestOptions::default());
        let fp_large_cold = Fingerprint::of("b", &[], &RequestOptions::default());
        entries.insert(fp_small_hot, entry_with(50, 10));
        entries.insert(fp_large_cold, entry_with(0, 1_000_000));

        assert_eq!(
            select_victim(&entries, EvictionPolicy::Adaptive),
            Some(fp_large_cold)
        );
    }
}
