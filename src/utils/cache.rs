// Listing cache: flat TTL map over JSON values plus in-flight load sharing,
// so concurrent readers of the same key trigger a single database query.
// Every clear bumps the key's generation; a load that started under an older
// generation still answers its callers but is never stored.

use crate::utils::error::AppError;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

pub const KEY_EDUCATION_USERS: &str = "users:education";
pub const KEY_HEALTHCARE_USERS: &str = "users:healthcare";
pub const KEY_JOBS: &str = "jobs:all";
pub const KEY_NEWS: &str = "news:all";
pub const KEY_CATEGORIES_PREFIX: &str = "categories:";

type SharedLoad = Shared<BoxFuture<'static, Result<Value, AppError>>>;

struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

#[derive(Default)]
struct Inflight {
    pending: HashMap<String, SharedLoad>,
    generations: HashMap<String, u64>,
}

impl Inflight {
    fn invalidate(&mut self, matches: impl Fn(&str) -> bool) {
        for (key, generation) in self.generations.iter_mut() {
            if matches(key) {
                *generation += 1;
            }
        }
        self.pending.retain(|key, _| !matches(key));
    }
}

pub struct ListingCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    inflight: Mutex<Inflight>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(Inflight::default()),
        }
    }

    fn inflight(&self) -> std::sync::MutexGuard<'_, Inflight> {
        self.inflight.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Returns the cached value, evicting it if older than the TTL
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(key)?;
            if now.saturating_duration_since(entry.stored_at) <= self.ttl {
                return Some(entry.data.clone());
            }
        }
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
        None
    }

    pub fn set(&self, key: &str, data: Value) {
        self.set_at(key, data, Instant::now());
    }

    fn set_at(&self, key: &str, data: Value, stored_at: Instant) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), CacheEntry { data, stored_at });
        }
    }

    /// `Some(key)` drops one entry, `None` drops everything
    pub fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => self.inflight().invalidate(|k| k == key),
            None => self.inflight().invalidate(|_| true),
        }
        if let Ok(mut entries) = self.entries.write() {
            match key {
                Some(key) => {
                    entries.remove(key);
                }
                None => entries.clear(),
            }
        }
    }

    pub fn clear_prefix(&self, prefix: &str) {
        self.inflight().invalidate(|k| k.starts_with(prefix));
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|key, _| !key.starts_with(prefix));
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Serves `key` from the cache, otherwise runs `load` once for all
    /// concurrent callers and caches a successful result.
    pub async fn get_or_load<F>(&self, key: &str, load: F) -> Result<Value, AppError>
    where
        F: Future<Output = Result<Value, AppError>> + Send + 'static,
    {
        if let Some(hit) = self.get(key) {
            log::debug!("📦 Cache hit: {}", key);
            return Ok(hit);
        }

        let (generation, shared) = {
            let mut inflight = self.inflight();
            let generation = *inflight.generations.entry(key.to_string()).or_insert(0);
            let shared = match inflight.pending.get(key) {
                Some(shared) => shared.clone(),
                None => {
                    let shared = load.boxed().shared();
                    inflight.pending.insert(key.to_string(), shared.clone());
                    shared
                }
            };
            (generation, shared)
        };

        let result = shared.clone().await;

        // Stored under the lock so a concurrent clear lands after the write
        let mut inflight = self.inflight();
        if inflight.pending.get(key).map_or(false, |current| current.ptr_eq(&shared)) {
            inflight.pending.remove(key);
        }
        let current = inflight.generations.get(key).copied().unwrap_or(0);
        match &result {
            Ok(data) if current == generation => self.set(key, data.clone()),
            Ok(_) => log::debug!("🗑️ Discarding stale load for {}", key),
            Err(_) => {}
        }
        result
    }
}

pub fn categories_key(user_type: Option<&str>) -> String {
    format!("{}{}", KEY_CATEGORIES_PREFIX, user_type.unwrap_or("all"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = ListingCache::new(Duration::from_secs(300));
        let start = Instant::now();
        cache.set_at("jobs:all", serde_json::json!([1, 2]), start);

        assert_eq!(cache.get_at("jobs:all", start + Duration::from_secs(299)), Some(serde_json::json!([1, 2])));
        assert_eq!(cache.get_at("jobs:all", start + Duration::from_secs(301)), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_single_key_or_everything() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.set("a", Value::from(1));
        cache.set("b", Value::from(2));

        cache.clear(Some("a"));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());

        cache.clear(None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn clear_prefix_only_hits_matching_keys() {
        let cache = ListingCache::new(Duration::from_secs(60));
        cache.set(&categories_key(Some("education")), Value::Null);
        cache.set(&categories_key(None), Value::Null);
        cache.set(KEY_JOBS, Value::Null);

        cache.clear_prefix(KEY_CATEGORIES_PREFIX);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(KEY_JOBS).is_some());
    }

    #[tokio::test]
    async fn concurrent_loads_share_one_query() {
        let cache = Arc::new(ListingCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));

        let make_load = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, AppError>(serde_json::json!({ "users": [] }))
        };

        let (a, b) = tokio::join!(
            cache.get_or_load(KEY_EDUCATION_USERS, make_load(calls.clone())),
            cache.get_or_load(KEY_EDUCATION_USERS, make_load(calls.clone())),
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Served from cache afterwards
        cache.get_or_load(KEY_EDUCATION_USERS, make_load(calls.clone())).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let cache = ListingCache::new(Duration::from_secs(60));

        let failed = cache
            .get_or_load(KEY_NEWS, async { Err(AppError::DatabaseError("down".into())) })
            .await;
        assert!(failed.is_err());
        assert!(cache.get(KEY_NEWS).is_none());

        let ok = cache.get_or_load(KEY_NEWS, async { Ok(Value::from("fresh")) }).await;
        assert_eq!(ok.unwrap(), Value::from("fresh"));
    }

    #[tokio::test]
    async fn clear_during_load_drops_the_stale_result() {
        let cache = ListingCache::new(Duration::from_secs(300));

        let (loaded, _) = tokio::join!(
            cache.get_or_load(KEY_EDUCATION_USERS, async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(serde_json::json!(["blocked-user"]))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                cache.clear(Some(KEY_EDUCATION_USERS));
            },
        );

        // The caller still gets its answer, but it is not cached
        assert_eq!(loaded.unwrap(), serde_json::json!(["blocked-user"]));
        assert!(cache.get(KEY_EDUCATION_USERS).is_none());
    }

    #[tokio::test]
    async fn readers_after_a_clear_start_a_fresh_load() {
        let cache = ListingCache::new(Duration::from_secs(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |calls: Arc<AtomicUsize>, delay: u64, value: &'static str| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, AppError>(Value::from(value))
        };

        let (stale, fresh) = tokio::join!(
            cache.get_or_load(KEY_CATEGORIES_PREFIX, load(calls.clone(), 50, "before")),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                cache.clear_prefix(KEY_CATEGORIES_PREFIX);
                cache.get_or_load(KEY_CATEGORIES_PREFIX, load(calls.clone(), 10, "after")).await
            },
        );

        assert_eq!(stale.unwrap(), Value::from("before"));
        assert_eq!(fresh.unwrap(), Value::from("after"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(KEY_CATEGORIES_PREFIX), Some(Value::from("after")));
    }
}
