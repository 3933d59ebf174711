//! Refreshing cache for transit API responses
//!
//! Provides a `RefreshingCache` that memoizes fetch results per key with a
//! time-to-live. The map sits behind a mutex that is never held across an
//! `.await`, so lookups and per-key replacement are atomic while fetches for
//! different keys may run concurrently.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ApiError;

/// Default time-to-live for cache entries in seconds
pub const DEFAULT_TTL_SECS: i64 = 60;

/// A memoized response for one request key
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The last successfully fetched value
    data: V,
    /// When the value was fetched
    cached_at: DateTime<Utc>,
    /// The validity window the value was fetched with
    ttl: Duration,
}

impl<V: Clone> CacheEntry<V> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at < ttl
    }

    fn snapshot(&self, now: DateTime<Utc>, ttl: Duration) -> CachedData<V> {
        CachedData {
            data: self.data.clone(),
            cached_at: self.cached_at,
            is_expired: !self.is_fresh(now, ttl),
        }
    }
}

/// A copy of a cache entry, including metadata about its freshness
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally fetched
    pub cached_at: DateTime<Utc>,
    /// Whether the entry had outlived its TTL when it was read
    pub is_expired: bool,
}

/// A fetch for `key` failed
///
/// The cache entry for `key` is left untouched. If one existed, a copy of it is
/// carried in `stale` so the caller can choose to present it as degraded data.
#[derive(Debug, Error)]
#[error("Failed to fetch {key}: {source}")]
pub struct FetchError<K, V> {
    /// The request key that failed
    pub key: K,
    /// The underlying transport or decode failure
    pub source: ApiError,
    /// The previous entry for this key, if any
    pub stale: Option<CachedData<V>>,
}

impl<K, V> FetchError<K, V> {
    /// Returns the stale value, if the key had been fetched before
    pub fn stale_value(&self) -> Option<&V> {
        self.stale.as_ref().map(|cached| &cached.data)
    }
}

/// In-memory memoization of fetch results with a per-call TTL
///
/// One cache is created per dashboard session and shared by reference with every
/// consumer. It never persists anything and never retries a failed fetch on its
/// own: the next `get` for the key is the retry.
#[derive(Debug)]
pub struct RefreshingCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for RefreshingCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> RefreshingCache<K, V>
where
    K: Eq + Hash + Clone + Display,
    V: Clone,
{
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // Entries are replaced whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value for `key`, fetching it if missing or stale
    ///
    /// Equivalent to [`RefreshingCache::get_at`] with the current time.
    pub async fn get<F, Fut>(&self, key: K, ttl: Duration, fetch: F) -> Result<V, FetchError<K, V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>>,
    {
        self.get_at(key, ttl, Utc::now(), fetch).await
    }

    /// Returns the value for `key` as seen at time `now`
    ///
    /// # Arguments
    /// * `key` - Identifies the upstream request
    /// * `ttl` - How long a fetched value stays fresh
    /// * `now` - The current time, recorded as the fetch time on success
    /// * `fetch` - Performs the network call; invoked at most once
    ///
    /// # Returns
    /// * `Ok(V)` - A fresh cached value, or the newly fetched one
    /// * `Err(FetchError)` - The fetch failed; the entry is unchanged and its
    ///   previous value, if any, is carried in the error
    pub async fn get_at<F, Fut>(
        &self,
        key: K,
        ttl: Duration,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<V, FetchError<K, V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ApiError>>,
    {
        let stale = {
            let entries = self.lock();
            match entries.get(&key) {
                Some(entry) if entry.is_fresh(now, ttl) => {
                    debug!(event = "cache.hit", key = %key);
                    return Ok(entry.data.clone());
                }
                Some(entry) => Some(entry.snapshot(now, ttl)),
                None => None,
            }
        };

        debug!(event = "cache.fetch_started", key = %key, has_stale = stale.is_some());

        match fetch().await {
            Ok(value) => {
                self.lock().insert(
                    key,
                    CacheEntry {
                        data: value.clone(),
                        cached_at: now,
                        ttl,
                    },
                );
                Ok(value)
            }
            Err(source) => {
                warn!(
                    event = "cache.fetch_failed",
                    key = %key,
                    error = %source,
                    has_stale = stale.is_some()
                );
                Err(FetchError { key, source, stale })
            }
        }
    }

    /// Reads an entry without fetching
    ///
    /// Freshness is judged against the TTL the entry was fetched with.
    pub fn peek(&self, key: &K, now: DateTime<Utc>) -> Option<CachedData<V>> {
        self.lock()
            .get(key)
            .map(|entry| entry.snapshot(now, entry.ttl))
    }

    /// Removes every entry
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        let cleared = entries.len();
        entries.clear();
        info!(event = "cache.invalidated_all", cleared);
    }

    /// Removes the entry for `key`; missing keys are ignored
    pub fn invalidate_key(&self, key: &K) {
        if self.lock().remove(key).is_some() {
            debug!(event = "cache.invalidated_key", key = %key);
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
