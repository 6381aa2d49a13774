//! Bounded FIFO/TTL cache store.

use super::key::CacheKey;
use crate::types::DiagnosisResult;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Configuration for the diagnosis cache, fixed at construction.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are logical misses.
    pub ttl: Duration,
    /// Hard upper bound on entry count; insertion at capacity evicts the
    /// oldest-inserted entry.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: 100,
        }
    }
}

/// Read-only cache introspection, exposed on the administrative surface.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

struct Entry {
    result: DiagnosisResult,
    inserted_at: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

// Map and insertion-order queue live behind one mutex so a concurrent put
// during eviction cannot desynchronize them or double-evict.
struct Inner {
    entries: HashMap<String, Entry>,
    order: VecDeque<String>,
}

/// Bounded, time-expiring store for structured diagnosis results.
///
/// Created once per process and shared across in-flight requests; all
/// operations are safe under concurrent invocation.
pub struct DiagnosisCache {
    inner: Mutex<Inner>,
    config: CacheConfig,
}

impl DiagnosisCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            config,
        }
    }

    /// Look up an unexpired entry.
    ///
    /// On a hit, returns a copy of the stored result with `cached = true`.
    /// A stale entry is removed and reported as a miss; a true miss has no
    /// side effect.
    pub fn get(&self, key: &CacheKey) -> Option<DiagnosisResult> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        match inner.entries.get(key.as_str()) {
            Some(entry) if !entry.is_expired(self.config.ttl) => {
                let mut result = entry.result.clone();
                result.cached = true;
                debug!(key = %key, "cache hit");
                return Some(result);
            }
            Some(_) => {}
            None => return None,
        }
        // Stale entry: purge it and report a miss.
        inner.entries.remove(key.as_str());
        inner.order.retain(|k| k != key.as_str());
        debug!(key = %key, "cache entry expired");
        None
    }

    /// Insert a result, evicting the single oldest-inserted entry first if
    /// the store is at capacity. Overwriting an existing key counts as a
    /// fresh insertion for FIFO ordering.
    pub fn put(&self, key: &CacheKey, result: DiagnosisResult) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if inner.entries.contains_key(key.as_str()) {
            inner.order.retain(|k| k != key.as_str());
        } else if inner.entries.len() >= self.config.max_entries {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                debug!(key = %oldest, "cache evicted oldest entry");
            }
        }
        inner.order.push_back(key.as_str().to_string());
        inner.entries.insert(
            key.as_str().to_string(),
            Entry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Empty the store immediately (operator-triggered invalidation).
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.entries.clear();
        inner.order.clear();
        debug!("cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        CacheStats {
            size: inner.entries.len(),
            max_entries: self.config.max_entries,
            ttl_seconds: self.config.ttl.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, SourceTier};

    fn sample_result(disease: &str) -> DiagnosisResult {
        DiagnosisResult {
            source: SourceTier::Mock,
            disease: disease.to_string(),
            confidence: 0.8,
            severity: Severity::Moderate,
            symptoms: vec!["leaf spots".into()],
            treatment: vec!["apply fungicide".into()],
            recommendation: "Remove affected leaves".into(),
            cached: false,
        }
    }

    fn key(n: usize) -> CacheKey {
        CacheKey::from_parts(format!("image-{n}").as_bytes(), "tomato:test")
    }

    fn small_cache(max_entries: usize) -> DiagnosisCache {
        DiagnosisCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            max_entries,
        })
    }

    #[test]
    fn test_hit_is_flagged_cached() {
        let cache = small_cache(10);
        cache.put(&key(1), sample_result("Early Blight"));

        let first = cache.get(&key(1)).expect("hit");
        let second = cache.get(&key(1)).expect("hit");
        assert!(first.cached);
        assert!(second.cached);
        assert_eq!(first.disease, second.disease);
        assert_eq!(first.confidence, second.confidence);
    }

    #[test]
    fn test_miss_has_no_side_effect() {
        let cache = small_cache(10);
        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = small_cache(3);
        for n in 0..4 {
            cache.put(&key(n), sample_result(&format!("d{n}")));
        }
        // First-inserted key evicted, all later keys survive.
        assert!(cache.get(&key(0)).is_none());
        for n in 1..4 {
            assert!(cache.get(&key(n)).is_some(), "key {n} should remain");
        }
        assert_eq!(cache.stats().size, 3);
    }

    #[test]
    fn test_eviction_ignores_access_recency() {
        let cache = small_cache(2);
        cache.put(&key(0), sample_result("d0"));
        cache.put(&key(1), sample_result("d1"));
        // Reading key 0 must not rescue it: FIFO, not LRU.
        assert!(cache.get(&key(0)).is_some());
        cache.put(&key(2), sample_result("d2"));
        assert!(cache.get(&key(0)).is_none());
        assert!(cache.get(&key(1)).is_some());
    }

    #[test]
    fn test_overwrite_refreshes_fifo_position() {
        let cache = small_cache(2);
        cache.put(&key(0), sample_result("old"));
        cache.put(&key(1), sample_result("d1"));
        cache.put(&key(0), sample_result("new"));
        // Key 1 is now the oldest insertion and gets evicted next.
        cache.put(&key(2), sample_result("d2"));
        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.get(&key(0)).unwrap().disease, "new");
        assert!(cache.get(&key(2)).is_some());
        assert_eq!(cache.stats().size, 2);
    }

    #[test]
    fn test_ttl_expiry_reduces_size() {
        let cache = DiagnosisCache::new(CacheConfig {
            ttl: Duration::from_millis(20),
            max_entries: 10,
        });
        cache.put(&key(1), sample_result("d1"));
        assert!(cache.get(&key(1)).is_some());
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get(&key(1)).is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_clear() {
        let cache = small_cache(10);
        cache.put(&key(1), sample_result("d1"));
        cache.put(&key(2), sample_result("d2"));
        cache.clear();
        assert_eq!(cache.stats().size, 0);
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn test_stats_shape() {
        let cache = DiagnosisCache::new(CacheConfig {
            ttl: Duration::from_secs(1800),
            max_entries: 50,
        });
        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.max_entries, 50);
        assert_eq!(stats.ttl_seconds, 1800);
    }

    #[test]
    fn test_concurrent_puts_respect_bound() {
        use std::sync::Arc;

        let cache = Arc::new(small_cache(8));
        let mut handles = Vec::new();
        for t in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for n in 0..50 {
                    let k = key(t * 1000 + n);
                    cache.put(&k, sample_result("d"));
                    let _ = cache.get(&k);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.stats().size <= 8);
    }
}
