use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde_json::Value;
use smartdc_core::time::{millis_between, now, DateTime};
use std::time::Duration;

/// Result of a cached or fetched read.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// A decoded response body.
    Value(Value),
    /// The resource was deleted through this client and the deletion is still fresh.
    Deleted,
}

impl Fetched {
    /// The body, or `None` for a deleted resource.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Fetched::Value(v) => Some(v),
            Fetched::Deleted => None,
        }
    }

    /// Whether this is the deletion marker.
    pub fn is_deleted(&self) -> bool {
        matches!(self, Fetched::Deleted)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Fetched,
    created_at: DateTime,
}

/// Bounded, expiring response cache keyed by request path.
///
/// Entries are never purged on expiry. A stale entry is ignored by [`ResponseCache::get`]
/// and replaced by the next write for the same key. Once full, the least recently used
/// entry is evicted.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Option<Cache<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: u64, default_ttl: Duration) -> Self {
        let entries: Cache<String, CacheEntry> = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            entries: Some(entries),
            default_ttl,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            entries: None,
            default_ttl: Duration::ZERO,
        }
    }

    /// Whether this cache stores anything at all.
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// TTL applied when a lookup has no override.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// Returns `false` if the cache is disabled.
    pub fn put(&self, key: &str, value: Fetched) -> bool {
        self.put_at(key, value, now())
    }

    /// Look `key` up, honoring `ttl` if given or the default TTL otherwise.
    pub fn get(&self, key: &str, ttl: Option<Duration>) -> Option<Fetched> {
        self.get_at(key, ttl, now())
    }

    /// Number of live entries. Pending evictions may not be reflected yet.
    pub fn len(&self) -> u64 {
        self.entries.as_ref().map_or(0, |c| c.entry_count())
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put_at(&self, key: &str, value: Fetched, at: DateTime) -> bool {
        let Some(entries) = &self.entries else {
            return false;
        };

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: at,
            },
        );
        true
    }

    fn get_at(&self, key: &str, ttl: Option<Duration>, at: DateTime) -> Option<Fetched> {
        let entry = self.entries.as_ref()?.get(key)?;

        let ttl_ms = ttl.unwrap_or(self.default_ttl).as_millis();
        let age_ms = u128::from(millis_between(entry.created_at, at));
        (age_ms <= ttl_ms).then_some(entry.value)
    }

    #[cfg(test)]
    fn sync(&self) {
        if let Some(entries) = &self.entries {
            entries.run_pending_tasks();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_hit_and_miss_by_age() {
        let cache = ResponseCache::new(1000, MINUTE);
        let t0 = now();
        let v = Fetched::Value(json!({"id": "m1"}));

        assert!(cache.put_at("/my/machines/m1", v.clone(), t0));

        let hit = cache.get_at(
            "/my/machines/m1",
            None,
            t0 + TimeDelta::milliseconds(59_999),
        );
        assert_eq!(hit, Some(v.clone()));

        let exact = cache.get_at("/my/machines/m1", None, t0 + TimeDelta::milliseconds(60_000));
        assert_eq!(exact, Some(v));

        let miss = cache.get_at(
            "/my/machines/m1",
            None,
            t0 + TimeDelta::milliseconds(60_001),
        );
        assert_eq!(miss, None);
    }

    #[test]
    fn test_ttl_override() {
        let cache = ResponseCache::new(1000, MINUTE);
        let t0 = now();
        cache.put_at("/my/images", Fetched::Value(json!([])), t0);

        let later = t0 + TimeDelta::seconds(5);
        assert!(cache
            .get_at("/my/images", Some(Duration::from_secs(1)), later)
            .is_none());
        assert!(cache
            .get_at("/my/images", Some(Duration::from_secs(10)), later)
            .is_some());
    }

    #[test]
    fn test_stale_entry_is_overwritten_not_purged() {
        let cache = ResponseCache::new(1000, MINUTE);
        let t0 = now();
        cache.put_at("k", Fetched::Value(json!(1)), t0);

        let t1 = t0 + TimeDelta::minutes(5);
        assert_eq!(cache.get_at("k", None, t1), None);

        cache.put_at("k", Fetched::Value(json!(2)), t1);
        assert_eq!(cache.get_at("k", None, t1), Some(Fetched::Value(json!(2))));
    }

    #[test]
    fn test_tombstone_is_distinct() {
        let cache = ResponseCache::new(1000, MINUTE);
        cache.put("/my/machines/gone", Fetched::Deleted);
        cache.put("/my/machines/here", Fetched::Value(Value::Null));

        let gone = cache.get("/my/machines/gone", None);
        assert_eq!(gone, Some(Fetched::Deleted));
        assert!(gone.unwrap().is_deleted());

        let here = cache.get("/my/machines/here", None);
        assert_eq!(here, Some(Fetched::Value(Value::Null)));

        assert_eq!(cache.get("/my/machines/never", None), None);
    }

    #[test]
    fn test_disabled_cache() {
        let cache = ResponseCache::disabled();
        assert!(!cache.is_enabled());
        assert!(!cache.put("k", Fetched::Value(json!(1))));
        assert_eq!(cache.get("k", Some(MINUTE)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = ResponseCache::new(10, MINUTE);
        for i in 0..100 {
            cache.put(&format!("/my/machines/{i}"), Fetched::Value(json!(i)));
        }
        cache.sync();

        assert!(cache.len() <= 10);
    }

    #[test]
    fn test_recently_read_entry_survives_eviction() {
        let cache = ResponseCache::new(3, MINUTE);
        for key in ["a", "b", "c"] {
            cache.put(key, Fetched::Value(json!(key)));
        }
        cache.sync();

        assert!(cache.get("a", None).is_some());
        cache.sync();

        cache.put("d", Fetched::Value(json!("d")));
        cache.sync();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("b", None), None);
        assert_eq!(cache.get("a", None), Some(Fetched::Value(json!("a"))));
        assert_eq!(cache.get("d", None), Some(Fetched::Value(json!("d"))));
    }
}
