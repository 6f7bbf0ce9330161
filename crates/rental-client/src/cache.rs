//! # Query Cache
//!
//! Shared, typed cache of query results keyed by [`QueryKey`].
//!
//! ## Entry Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   begin(key) ──► epoch N          fetch in flight                       │
//! │        │                                                                │
//! │        │          invalidate(group) ──► entries under group: stale      │
//! │        │                              ──► epochs under group: N+1       │
//! │        ▼                                                                │
//! │   resolve(key, N, value)                                                │
//! │        ├── epoch still N ──► stored, fresh until stale_time passes      │
//! │        └── epoch moved on ─► discarded (resolved before invalidation)   │
//! │                                                                         │
//! │   Two resolves in the same epoch: the last one to arrive wins.          │
//! │                                                                         │
//! │   remove/clear drop epochs with their entries; keys begun afterwards    │
//! │   start above every epoch handed out before, so nothing is reused.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rental_core::QueryKey;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::config::ClientConfig;

type CachedValue = Arc<dyn Any + Send + Sync>;

struct Entry {
    value: CachedValue,
    fetched_at: Instant,
    invalidated: bool,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    epochs: HashMap<QueryKey, u64>,
    /// Last epoch handed out, across all keys.
    clock: u64,
    /// Epoch for keys first seen after the last remove/clear.
    floor: u64,
}

impl CacheInner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Cloneable handle; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheInner>>,
    stale_time: Duration,
    /// Bumped on every invalidation so observers know to refetch.
    generation: Arc<watch::Sender<u64>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stale_time", &self.stale_time)
            .field("generation", &*self.generation.borrow())
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache::new(Duration::ZERO)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        let (generation, _) = watch::channel(0);
        QueryCache {
            inner: Arc::new(RwLock::new(CacheInner::default())),
            stale_time,
            generation: Arc::new(generation),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        QueryCache::new(config.stale_time())
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Cached value regardless of freshness.
    pub async fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Cached value only if it is neither invalidated nor older than the
    /// stale time. With a zero stale time nothing is ever fresh.
    pub async fn get_fresh<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let inner = self.inner.read().await;
        let entry = inner.entries.get(key)?;
        if entry.invalidated || entry.fetched_at.elapsed() >= self.stale_time {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let inner = self.inner.read().await;
        match inner.entries.get(key) {
            Some(entry) => entry.invalidated || entry.fetched_at.elapsed() >= self.stale_time,
            None => true,
        }
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.inner.read().await.entries.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Marks the start of a fetch and returns the epoch its result must match.
    pub async fn begin(&self, key: &QueryKey) -> u64 {
        let mut inner = self.inner.write().await;
        let floor = inner.floor;
        *inner.epochs.entry(key.clone()).or_insert(floor)
    }

    /// Stores a fetch result unless the key was invalidated after `begin`.
    /// Returns whether the value was kept.
    pub async fn resolve<T>(&self, key: &QueryKey, epoch: u64, value: T) -> bool
    where
        T: Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        let current = inner.epochs.get(key).copied();
        if current != Some(epoch) {
            debug!(key = %key, epoch, ?current, "Discarding result that resolved before invalidation");
            return false;
        }
        inner.entries.insert(
            key.clone(),
            Entry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        true
    }

    /// Writes a value directly, e.g. after a mutation returns the record.
    pub async fn set<T>(&self, key: &QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let mut inner = self.inner.write().await;
        inner.entries.insert(
            key.clone(),
            Entry {
                value: Arc::new(value),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Marks every entry under `group` stale and moves their epochs on, so
    /// in-flight fetches for those keys are discarded. Returns how many
    /// cached entries were marked.
    pub async fn invalidate(&self, group: &QueryKey) -> usize {
        let marked = {
            let mut inner = self.inner.write().await;
            let mut marked = 0;
            for (key, entry) in inner.entries.iter_mut() {
                if key.starts_with(group) {
                    entry.invalidated = true;
                    marked += 1;
                }
            }

            let under_group: HashSet<QueryKey> = inner
                .entries
                .keys()
                .chain(inner.epochs.keys())
                .filter(|key| key.starts_with(group))
                .cloned()
                .collect();
            for key in under_group {
                let epoch = inner.tick();
                inner.epochs.insert(key, epoch);
            }
            marked
        };

        self.generation.send_modify(|g| *g += 1);
        debug!(group = %group, marked, "Invalidated cache group");
        marked
    }

    /// Drops every entry under `group`, along with its epoch. Fetches still
    /// in flight for those keys are discarded when they resolve.
    pub async fn remove(&self, group: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.starts_with(group));
        inner.epochs.retain(|key, _| !key.starts_with(group));
        inner.floor = inner.tick();
        before - inner.entries.len()
    }

    /// Drops everything; used on logout.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.epochs.clear();
        inner.floor = inner.tick();
        drop(inner);
        self.generation.send_modify(|g| *g += 1);
        debug!("Query cache cleared");
    }

    /// Fires after every invalidation or clear.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    #[cfg(test)]
    async fn tracked_epochs(&self) -> usize {
        self.inner.read().await.epochs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::Resource;

    fn list_key(skip: u64) -> QueryKey {
        QueryKey::list(Resource::Categories, &serde_json::json!({"skip": skip, "limit": 10}))
    }

    #[tokio::test]
    async fn test_zero_stale_time_never_fresh() {
        let cache = QueryCache::default();
        let key = list_key(0);
        cache.set(&key, vec![1u32, 2]).await;
        assert_eq!(cache.get::<Vec<u32>>(&key).await, Some(vec![1, 2]));
        assert_eq!(cache.get_fresh::<Vec<u32>>(&key).await, None);
        assert!(cache.is_stale(&key).await);
    }

    #[tokio::test]
    async fn test_fresh_until_invalidated() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = list_key(0);
        let epoch = cache.begin(&key).await;
        assert!(cache.resolve(&key, epoch, "rows".to_string()).await);
        assert_eq!(cache.get_fresh::<String>(&key).await.as_deref(), Some("rows"));

        let marked = cache.invalidate(&QueryKey::resource(Resource::Categories)).await;
        assert_eq!(marked, 1);
        assert_eq!(cache.get_fresh::<String>(&key).await, None);
        assert_eq!(cache.get::<String>(&key).await.as_deref(), Some("rows"));
    }

    #[tokio::test]
    async fn test_resolve_before_invalidation_is_discarded() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = list_key(0);
        let first = cache.begin(&key).await;
        cache.invalidate(&QueryKey::lists(Resource::Categories)).await;
        let second = cache.begin(&key).await;
        assert_ne!(first, second);

        assert!(!cache.resolve(&key, first, 1u32).await);
        assert!(cache.resolve(&key, second, 2u32).await);
        assert_eq!(cache.get::<u32>(&key).await, Some(2));
    }

    #[tokio::test]
    async fn test_last_resolve_wins_within_epoch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = list_key(0);
        let a = cache.begin(&key).await;
        let b = cache.begin(&key).await;
        assert!(cache.resolve(&key, b, "b").await);
        assert!(cache.resolve(&key, a, "a").await);
        assert_eq!(cache.get::<&str>(&key).await, Some("a"));
    }

    #[tokio::test]
    async fn test_invalidation_is_scoped_to_group() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let categories = list_key(0);
        let brands = QueryKey::lists(Resource::Brands);
        cache.set(&categories, 1u8).await;
        cache.set(&brands, 2u8).await;

        cache.invalidate(&QueryKey::resource(Resource::Categories)).await;
        assert!(cache.is_stale(&categories).await);
        assert!(!cache.is_stale(&brands).await);

        assert_eq!(cache.remove(&QueryKey::resource(Resource::Categories)).await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_and_clear_prune_epochs() {
        let cache = QueryCache::new(Duration::from_secs(60));
        for skip in 0..50 {
            let key = list_key(skip);
            let epoch = cache.begin(&key).await;
            cache.resolve(&key, epoch, skip).await;
        }
        cache.invalidate(&QueryKey::lists(Resource::Categories)).await;
        assert_eq!(cache.tracked_epochs().await, 50);

        assert_eq!(cache.remove(&QueryKey::resource(Resource::Categories)).await, 50);
        assert_eq!(cache.tracked_epochs().await, 0);

        let key = list_key(0);
        let before_clear = cache.begin(&key).await;
        cache.clear().await;
        assert_eq!(cache.tracked_epochs().await, 0);

        // A fetch begun before the clear cannot land in the new epoch.
        let after_clear = cache.begin(&key).await;
        assert_ne!(before_clear, after_clear);
        assert!(!cache.resolve(&key, before_clear, 1u64).await);
        assert!(cache.resolve(&key, after_clear, 2u64).await);
        assert_eq!(cache.get::<u64>(&key).await, Some(2));
    }

    #[tokio::test]
    async fn test_in_flight_fetch_after_remove_is_discarded() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = list_key(0);
        let epoch = cache.begin(&key).await;
        cache.remove(&QueryKey::resource(Resource::Categories)).await;
        assert!(!cache.resolve(&key, epoch, 1u32).await);
        assert!(!cache.contains(&key).await);
    }

    #[tokio::test]
    async fn test_wrong_type_reads_as_miss() {
        let cache = QueryCache::default();
        let key = list_key(0);
        cache.set(&key, 5u32).await;
        assert_eq!(cache.get::<String>(&key).await, None);
    }

    #[tokio::test]
    async fn test_subscribers_see_invalidations() {
        let cache = QueryCache::default();
        let mut rx = cache.subscribe();
        cache.invalidate(&QueryKey::resource(Resource::Skus)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
        cache.clear().await;
        assert_eq!(*rx.borrow(), 2);
    }
}
