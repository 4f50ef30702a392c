//! Process-lifetime response cache keyed by canonical file key.
//!
//! Entries never expire and are never evicted. Each key owns a
//! [`OnceCell`], so concurrent misses for the same key share a single
//! upstream fetch. A failed fetch leaves the cell empty and the next
//! caller fetches again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

/// Whether a lookup was answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Memoizes values per key for the lifetime of the process.
pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key.to_string()).or_default().clone()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> ResponseCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Store a value. An already-populated key keeps its first value.
    pub fn put(&self, key: &str, value: V) {
        let _ = self.slot(key).set(value);
    }

    /// Return the cached value for `key`, or run `fetch` to populate it.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<(V, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.slot(key);
        if let Some(value) = cell.get() {
            return Ok((value.clone(), CacheStatus::Hit));
        }

        let mut fetched = false;
        let value = cell
            .get_or_try_init(|| {
                fetched = true;
                fetch()
            })
            .await?;

        let status = if fetched {
            CacheStatus::Miss
        } else {
            CacheStatus::Hit
        };
        Ok((value.clone(), status))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache: ResponseCache<String> = ResponseCache::new();
        let calls = AtomicUsize::new(0);

        for expected in [CacheStatus::Miss, CacheStatus::Hit] {
            let (value, status) = cache
                .get_or_fetch("ABC", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>("payload".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "payload");
            assert_eq!(status, expected);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ResponseCache<u32> = ResponseCache::new();

        let err = cache
            .get_or_fetch("k", || async { Err::<u32, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());
        assert!(cache.get("k").is_none());

        let (value, status) = cache
            .get_or_fetch("k", || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(status, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let cache: Arc<ResponseCache<u32>> = Arc::new(ResponseCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("same", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok::<_, ()>(42)
                    })
                    .await
                    .map(|(v, _)| v)
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_put_keeps_first_value() {
        let cache: ResponseCache<&str> = ResponseCache::new();
        cache.put("k", "first");
        cache.put("k", "second");
        assert_eq!(cache.get("k"), Some("first"));
        assert!(cache.get("other").is_none());
    }
}
