//! Query cache
//!
//! Table listings are cached per (table, credential) with a stale time.
//! Concurrent fetches of the same key share one request: callers queue on a
//! per-key lock and re-check the cache once they hold it.
//!
//! Invalidations bump a generation counter. A fetch that started before an
//! invalidation of its table stores its result as stale.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default age after which an entry is refetched
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(300);

/// Cache key: table name and credential fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub table: String,
    pub credential: String,
}

impl QueryKey {
    pub fn new(table: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            credential: credential.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.table, self.credential)
    }
}

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Keyed cache with stale time and single-flight fetches
pub struct QueryCache<V> {
    entries: DashMap<QueryKey, CacheEntry<V>>,
    inflight: DashMap<QueryKey, Arc<Mutex<()>>>,
    /// Bumped by every invalidation
    generation: AtomicU64,
    /// Generation of the last invalidation, per table
    table_invalidated: DashMap<String, u64>,
    /// Generation of the last `invalidate_all`
    all_invalidated: AtomicU64,
    stale_time: Duration,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            generation: AtomicU64::new(0),
            table_invalidated: DashMap::new(),
            all_invalidated: AtomicU64::new(0),
            stale_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.stale_time))
            .map(|entry| entry.value.clone())
    }

    /// Last value for `key`, fresh or not
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Cached value when fresh, otherwise the result of `fetcher`
    ///
    /// A failed fetch leaves the previous entry in place.
    pub async fn fetch<F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::trace!(key = %key, "Cache hit");
            return Ok(value);
        }

        let result = {
            let lock = self.inflight.entry(key.clone()).or_default().clone();
            let _guard = lock.lock().await;

            // Another caller may have filled the entry while we waited
            match self.get(key) {
                Some(value) => Ok(value),
                None => {
                    tracing::debug!(key = %key, "Cache miss, fetching");
                    let generation = self.generation();
                    fetcher().await.map(|value| {
                        self.insert_fetched(key.clone(), value.clone(), generation);
                        value
                    })
                }
            }
        };

        // Nobody else holds or waits on the lock once only the map owns it
        self.inflight
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    pub fn insert(&self, key: QueryKey, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Current invalidation generation; capture it before fetching
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store a value fetched since `generation`
    ///
    /// The entry is stale right away when its table was invalidated while
    /// the fetch was running.
    pub fn insert_fetched(&self, key: QueryKey, value: V, generation: u64) {
        let invalidated = self.invalidated_since(&key.table, generation);
        if invalidated {
            tracing::debug!(key = %key, "Invalidated during fetch, stored as stale");
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                invalidated,
            },
        );
    }

    fn invalidated_since(&self, table: &str, generation: u64) -> bool {
        let table_gen = self.table_invalidated.get(table).map_or(0, |g| *g);
        table_gen > generation || self.all_invalidated.load(Ordering::SeqCst) > generation
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark every key of `table` stale
    pub fn invalidate_table(&self, table: &str) {
        let generation = self.bump();
        self.table_invalidated.insert(table.to_string(), generation);
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().table == table {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(table = %table, count, "Cache invalidated");
    }

    pub fn invalidate_all(&self) {
        let generation = self.bump();
        self.all_invalidated.store(generation, Ordering::SeqCst);
        for mut entry in self.entries.iter_mut() {
            entry.invalidated = true;
        }
    }

    /// Keys fetched at least once
    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}
