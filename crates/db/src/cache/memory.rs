//! Default [`EntityCache`] backed by hash maps.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CacheKey, Cacheable, EntityCache};

struct Indexes<T> {
    by_id: HashMap<String, T>,
    by_key: HashMap<CacheKey, String>,
}

impl<T: Cacheable> Indexes<T> {
    /// Remove `id` and every secondary key that still points at it.
    fn remove(&mut self, id: &str) -> Option<T> {
        let old = self.by_id.remove(id)?;
        for key in old.cache_keys() {
            if self.by_key.get(&key).is_some_and(|owner| owner == id) {
                self.by_key.remove(&key);
            }
        }
        Some(old)
    }
}

/// Thread-safe in-memory cache with one primary and one secondary index.
///
/// Both indexes sit behind a single lock so a reader never observes a
/// secondary key pointing at a missing primary entry. There is no eviction.
pub struct MemoryCache<T> {
    inner: RwLock<Indexes<T>>,
}

impl<T: Cacheable> MemoryCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Indexes {
                by_id: HashMap::new(),
                by_key: HashMap::new(),
            }),
        }
    }

    /// Number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    /// Whether the cache holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every critical section leaves both maps consistent, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Indexes<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Cacheable> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Cacheable> fmt::Debug for MemoryCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        f.debug_struct("MemoryCache")
            .field("entries", &guard.by_id.len())
            .field("keys", &guard.by_key.len())
            .finish()
    }
}

impl<T: Cacheable> EntityCache<T> for MemoryCache<T> {
    fn put(&self, entity: T) {
        let id = entity.cache_id().to_string();
        let keys = entity.cache_keys();

        let mut guard = self.write();
        guard.remove(&id);
        for key in keys {
            guard.by_key.insert(key, id.clone());
        }
        guard.by_id.insert(id, entity);
    }

    fn get_by_id(&self, id: &str) -> Option<T> {
        self.read().by_id.get(id).cloned()
    }

    fn get_by_key(&self, key: &CacheKey) -> Option<T> {
        let guard = self.read();
        let id = guard.by_key.get(key)?;
        guard.by_id.get(id).cloned()
    }

    fn invalidate(&self, id: &str) {
        self.write().remove(id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::emoji_category;
    use crate::test_utils::{category_model, emoji_model};
    use crate::repositories::EmojiWithCategory;

    fn cached(id: &str, shortcode: &str, domain: Option<&str>) -> EmojiWithCategory {
        EmojiWithCategory::uncategorized(emoji_model(id, shortcode, domain))
    }

    #[test]
    fn test_put_indexes_every_key() {
        let cache = MemoryCache::new();
        let entry = cached("e1", "blobcat", None);
        cache.put(entry.clone());

        assert_eq!(cache.get_by_id("e1"), Some(entry.clone()));
        assert_eq!(
            cache.get_by_key(&CacheKey::Uri(entry.emoji.uri.clone())),
            Some(entry.clone())
        );
        assert_eq!(
            cache.get_by_key(&CacheKey::shortcode_domain("BLOBCAT", None)),
            Some(entry.clone())
        );
        assert_eq!(
            cache.get_by_key(&CacheKey::StaticUrl(entry.emoji.image_static_url.clone())),
            Some(entry)
        );
    }

    #[test]
    fn test_invalidate_removes_all_keys() {
        let cache = MemoryCache::new();
        let entry = cached("e1", "blobcat", Some("remote.example"));
        cache.put(entry.clone());

        cache.invalidate("e1");

        assert!(cache.get_by_id("e1").is_none());
        assert!(cache.get_by_key(&CacheKey::Uri(entry.emoji.uri.clone())).is_none());
        assert!(
            cache
                .get_by_key(&CacheKey::shortcode_domain("blobcat", Some("remote.example")))
                .is_none()
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_twice_keeps_latest_values() {
        let cache = MemoryCache::new();
        let first = cached("e1", "blobcat", None);
        let mut second = first.clone();
        second.emoji.disabled = true;

        cache.put(first);
        cache.put(second.clone());

        assert_eq!(cache.len(), 1);
        assert!(cache.get_by_id("e1").unwrap().emoji.disabled);
        assert_eq!(
            cache.get_by_key(&CacheKey::shortcode_domain("blobcat", None)),
            Some(second)
        );
    }

    #[test]
    fn test_put_drops_stale_secondary_keys() {
        let cache = MemoryCache::new();
        let first = cached("e1", "blobcat", None);
        let mut renamed = first.clone();
        renamed.emoji.shortcode = "blobfox".to_string();

        cache.put(first);
        cache.put(renamed);

        assert!(
            cache
                .get_by_key(&CacheKey::shortcode_domain("blobcat", None))
                .is_none()
        );
        assert!(
            cache
                .get_by_key(&CacheKey::shortcode_domain("blobfox", None))
                .is_some()
        );
    }

    #[test]
    fn test_invalidate_keeps_key_taken_over_by_other_entity() {
        let cache = MemoryCache::new();
        let old = cached("e1", "blobcat", None);
        let mut new = cached("e2", "blobcat", None);
        new.emoji.uri = "https://local.example/emoji/e2".to_string();

        cache.put(old);
        cache.put(new);
        cache.invalidate("e1");

        let hit = cache
            .get_by_key(&CacheKey::shortcode_domain("blobcat", None))
            .unwrap();
        assert_eq!(hit.emoji.id, "e2");
    }

    #[test]
    fn test_category_lookup_by_name() {
        let cache: MemoryCache<emoji_category::Model> = MemoryCache::new();
        cache.put(category_model("c1", "Reactions"));

        assert_eq!(
            cache.get_by_key(&CacheKey::name("REACTIONS")).unwrap().id,
            "c1"
        );
    }

    #[test]
    fn test_concurrent_put_and_get() {
        let cache = Arc::new(MemoryCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let id = format!("e{i}");
                    for _ in 0..100 {
                        cache.put(cached(&id, &format!("code{i}"), None));
                        assert!(cache.get_by_id(&id).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 8);
    }
}
