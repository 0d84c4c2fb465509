use log::info;
use std::collections::{hash_map::Entry, HashMap};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CachedValue<V> {
    value: V,
    loaded_at: Instant,
}

impl<V> CachedValue<V> {
    fn is_fresh(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(true, |ttl| self.loaded_at.elapsed() < ttl)
    }
}

/// Memoizes loaded tables and boundary collections by key.
///
/// Values are computed once per key and served thereafter until they expire
/// (when a time-to-live is configured) or are invalidated explicitly.
pub struct FrameCache<K, V> {
    ttl: Option<Duration>,
    entries: Mutex<HashMap<K, CachedValue<V>>>,
}

impl<K, V> FrameCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// `ttl: None` keeps entries for the lifetime of the cache.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, running `load` on a miss or when the
    /// cached value has expired. Failed loads are not cached.
    pub async fn get_or_load<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(&key) {
                if cached.is_fresh(self.ttl) {
                    info!("Cache hit for {:?}", key);
                    return Ok(cached.value.clone());
                }
                info!("Cache entry for {:?} expired, reloading", key);
            } else {
                info!("Cache miss for {:?}, loading", key);
            }
        }

        // Loading happens outside the lock.
        let loaded = load().await?;

        let mut entries = self.entries.lock().await;
        match entries.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_fresh(self.ttl) {
                    // Another caller finished first; keep theirs.
                    Ok(entry.get().value.clone())
                } else {
                    entry.insert(CachedValue {
                        value: loaded.clone(),
                        loaded_at: Instant::now(),
                    });
                    Ok(loaded)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(CachedValue {
                    value: loaded.clone(),
                    loaded_at: Instant::now(),
                });
                Ok(loaded)
            }
        }
    }

    /// Drops the entry for `key`. Returns whether an entry was present.
    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Drops every entry whose key matches `predicate`. Returns how many were dropped.
    pub async fn invalidate_where<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&K) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(counter: &AtomicUsize, value: u32) -> Result<u32, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_loads_once_per_key() {
        let cache: FrameCache<String, u32> = FrameCache::new(None);
        let loads = AtomicUsize::new(0);

        let first = cache
            .get_or_load("tmax".to_string(), || counted(&loads, 1))
            .await;
        let second = cache
            .get_or_load("tmax".to_string(), || counted(&loads, 2))
            .await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: FrameCache<&'static str, u32> = FrameCache::new(None);

        let failed = cache
            .get_or_load("rain", || async { Err::<u32, _>("missing".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);

        let loaded = cache
            .get_or_load("rain", || async { Ok::<_, String>(7) })
            .await;
        assert_eq!(loaded, Ok(7));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let cache: FrameCache<&'static str, u32> = FrameCache::new(None);
        let loads = AtomicUsize::new(0);

        cache.get_or_load("tmin", || counted(&loads, 1)).await.unwrap();
        assert!(cache.invalidate(&"tmin").await);
        assert!(!cache.invalidate(&"tmin").await);

        let reloaded = cache.get_or_load("tmin", || counted(&loads, 2)).await;
        assert_eq!(reloaded, Ok(2));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_where_drops_matching_keys() {
        let cache: FrameCache<(&'static str, Option<i32>), u32> = FrameCache::new(None);
        let keys = [
            ("tmax", None),
            ("tmax", Some(2020)),
            ("tmax", Some(2021)),
            ("tmin", None),
        ];
        for key in keys {
            cache.get_or_load(key, || async { Ok::<_, ()>(0) }).await.unwrap();
        }

        let dropped = cache.invalidate_where(|(folder, _)| *folder == "tmax").await;

        assert_eq!(dropped, 3);
        assert_eq!(cache.len().await, 1);
        assert!(cache.invalidate(&("tmin", None)).await);
    }

    #[tokio::test]
    async fn test_expired_entries_reload() {
        let cache: FrameCache<&'static str, u32> = FrameCache::new(Some(Duration::ZERO));
        let loads = AtomicUsize::new(0);

        cache.get_or_load("tmax", || counted(&loads, 1)).await.unwrap();
        let second = cache.get_or_load("tmax", || counted(&loads, 2)).await;

        assert_eq!(second, Ok(2));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let cache: FrameCache<u8, u8> = FrameCache::new(None);
        cache.get_or_load(1, || async { Ok::<_, ()>(1) }).await.unwrap();
        cache.get_or_load(2, || async { Ok::<_, ()>(2) }).await.unwrap();
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
