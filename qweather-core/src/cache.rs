//! TTL-keyed result cache with cache-or-fetch semantics.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.created) < self.ttl
    }
}

/// In-memory cache mapping request fingerprints to fetched results.
///
/// The cache holds no domain knowledge: the key must already encode every
/// parameter that affects the result, and the TTL is supplied per call.
/// Expired entries count as misses and are evicted lazily on access.
pub struct TtlCache<K, T> {
    entries: Mutex<HashMap<K, CacheEntry<T>>>,
}

impl<K, T> TtlCache<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` if still fresh; otherwise awaits
    /// `fetch`, stores its result under `key`, and returns it.
    ///
    /// A failed fetch stores nothing, so the next call re-attempts it. The
    /// lock is never held across the await; two concurrent misses on the
    /// same key may both fetch, and the later writer wins.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: K, ttl: Duration, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = Instant::now();
        {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(entry) if entry.is_fresh(now) => {
                    tracing::debug!("result cache hit");
                    return Ok(entry.value.clone());
                }
                Some(_) => {
                    entries.remove(&key);
                }
                None => {}
            }
        }

        tracing::debug!("result cache miss, fetching");
        let value = fetch().await?;

        self.lock().insert(
            key,
            CacheEntry {
                value: value.clone(),
                created: Instant::now(),
                ttl,
            },
        );
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<T>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<K, T> Default for TtlCache<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
