//! Resolution result caching.
//!
//! # Responsibilities
//! - Remember successful resolutions for a bounded time
//! - Evict entries lazily on read once expired
//!
//! # Design Decisions
//! - Only results are cached, never intermediate resources
//! - Failures are never stored, so a transient error is retried next call
//! - Key-level operations only; `DashMap` shards the locking

use dashmap::DashMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::observability::metrics;
use crate::resolver::clock::{Clock, SystemClock};
use crate::resolver::urls::ObservabilityUrls;

/// Default lifetime of a cached resolution.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Composite key identifying one resolution request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an environment-rooted resolution: `env:<ns>/<environment>`.
    pub fn environment(namespace: &str, environment: &str) -> Self {
        Self(format!("env:{}/{}", namespace, environment))
    }

    /// Key for a build-rooted resolution: `build:<ns>/<project>`.
    pub fn build(namespace: &str, project: &str) -> Self {
        Self(format!("build:{}/{}", namespace, project))
    }

}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ObservabilityUrls,
    expires_at: Instant,
}

/// A thread-safe, time-bounded cache of resolution results.
pub struct ReferenceCache<C: Clock = SystemClock> {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: C,
}

impl ReferenceCache<SystemClock> {
    /// Create a cache on the wall clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for ReferenceCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<C: Clock> ReferenceCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached result if it has not expired.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<ObservabilityUrls> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                metrics::record_cache_hit();
                return Some(entry.result.clone());
            }
            Some(_) => true,
            None => false,
        };

        // Shard read guard must be released before removal.
        if expired && self.entries.remove_if(key, |_, e| now >= e.expires_at).is_some() {
            metrics::record_cache_eviction();
            tracing::debug!(key = %key, "Evicted expired resolution");
        }
        metrics::record_cache_miss();
        None
    }

    /// Store a result for `ttl`, replacing any existing entry.
    pub fn put(&self, key: CacheKey, result: ObservabilityUrls, ttl: Duration) {
        let now = self.clock.now();
        // A TTL too large to represent is clamped to "expires now".
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        self.entries.insert(key, CacheEntry { result, expires_at });
    }

    /// Store a result for the cache's configured TTL.
    pub fn insert(&self, key: CacheKey, result: ObservabilityUrls) {
        self.put(key, result, self.ttl);
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Remove every expired entry; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, e| now < e.expires_at);
        let purged = before.saturating_sub(self.entries.len());
        for _ in 0..purged {
            metrics::record_cache_eviction();
        }
        purged
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Clock> fmt::Debug for ReferenceCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::clock::ManualClock;

    fn urls(observer: &str) -> ObservabilityUrls {
        ObservabilityUrls {
            observer_url: Some(observer.to_string()),
            rca_agent_url: None,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(CacheKey::environment("org-1", "dev").to_string(), "env:org-1/dev");
        assert_eq!(CacheKey::build("org-1", "shop").to_string(), "build:org-1/shop");
        assert_ne!(CacheKey::environment("a", "b"), CacheKey::build("a", "b"));
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(ReferenceCache::<SystemClock>::default().ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_get_before_and_after_expiry() {
        let clock = ManualClock::new();
        let cache = ReferenceCache::with_clock(Duration::from_secs(60), clock.clone());
        let key = CacheKey::environment("org-1", "dev");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), urls("http://a"));

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&key), Some(urls("http://a")));

        // Expiry is exclusive: at exactly expires_at the entry is gone.
        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites_and_resets_expiry() {
        let clock = ManualClock::new();
        let cache = ReferenceCache::with_clock(Duration::from_secs(10), clock.clone());
        let key = CacheKey::build("org-1", "shop");

        cache.insert(key.clone(), urls("http://old"));
        clock.advance(Duration::from_secs(8));
        cache.put(key.clone(), urls("http://new"), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get(&key), Some(urls("http://new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_not_configured_result_is_cacheable() {
        let cache = ReferenceCache::new(DEFAULT_TTL);
        let key = CacheKey::environment("org-1", "dev");
        cache.insert(key.clone(), ObservabilityUrls::default());
        assert_eq!(cache.get(&key), Some(ObservabilityUrls::default()));
    }

    #[test]
    fn test_invalidate_clear_and_purge() {
        let clock = ManualClock::new();
        let cache = ReferenceCache::with_clock(Duration::from_secs(10), clock.clone());
        let a = CacheKey::environment("org-1", "a");
        let b = CacheKey::environment("org-1", "b");

        cache.insert(a.clone(), urls("http://a"));
        assert!(cache.invalidate(&a));
        assert!(!cache.invalidate(&a));

        cache.insert(a.clone(), urls("http://a"));
        clock.advance(Duration::from_secs(5));
        cache.insert(b.clone(), urls("http://b"));
        clock.advance(Duration::from_secs(6));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get(&b), Some(urls("http://b")));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = std::sync::Arc::new(ReferenceCache::new(DEFAULT_TTL));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let key = CacheKey::environment("org", &format!("env-{}", (i + j) % 10));
                        cache.insert(key.clone(), urls("http://x"));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
