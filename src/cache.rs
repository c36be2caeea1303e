//! Keyed cache with a freshness window and shared in-flight loads.

use rustc_hash::FxHashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell};

/// How long fetched reference data and metrics stay fresh.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(10 * 60);

struct Slot<V> {
    created_at: Instant,
    cell: Arc<OnceCell<V>>,
}

pub struct FreshCache<K, V> {
    freshness: Duration,
    slots: Mutex<FxHashMap<K, Slot<V>>>,
}

impl<K, V> FreshCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(freshness: Duration) -> Self {
        Self {
            freshness,
            slots: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns the cached value for `key`, running `load` when there is none or it has
    /// gone stale. Concurrent callers for the same key share one load.
    pub async fn get_or_load<F, Fut>(&self, key: K, load: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut slots = self.slots.lock().await;
            let now = Instant::now();
            let slot = slots.entry(key).or_insert_with(|| Slot {
                created_at: now,
                cell: Arc::new(OnceCell::new()),
            });
            if slot.cell.initialized() && now.duration_since(slot.created_at) >= self.freshness {
                *slot = Slot {
                    created_at: now,
                    cell: Arc::new(OnceCell::new()),
                };
            }
            Arc::clone(&slot.cell)
        };

        cell.get_or_init(load).await.clone()
    }

    pub async fn invalidate(&self, key: &K) {
        self.slots.lock().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}

impl<K, V> Default for FreshCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}
