//! In-process entity caches.
//!
//! Each entity kind gets its own [`EntityCache`] instance, indexed by
//! primary ID and by the secondary keys the entity declares through
//! [`Cacheable`]. Lookups are synchronous and never touch storage.

mod accessor;
mod memory;

pub use accessor::get_or_load;
pub use memory::MemoryCache;

use crate::entities::emoji_category;
use crate::repositories::EmojiWithCategory;

/// Secondary lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Emoji `ActivityPub` URI.
    Uri(String),
    /// Lowercased shortcode plus domain (`None` = local).
    ShortcodeDomain {
        /// Lowercased shortcode.
        shortcode: String,
        /// Origin domain, `None` for local emojis.
        domain: Option<String>,
    },
    /// Emoji static image URL.
    StaticUrl(String),
    /// Lowercased category name.
    Name(String),
}

impl CacheKey {
    /// Key for a shortcode/domain pair. An empty domain means local.
    #[must_use]
    pub fn shortcode_domain(shortcode: &str, domain: Option<&str>) -> Self {
        Self::ShortcodeDomain {
            shortcode: shortcode.to_lowercase(),
            domain: domain.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }

    /// Key for a category name (case-insensitive).
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self::Name(name.to_lowercase())
    }
}

/// An entity that can live in an [`EntityCache`].
pub trait Cacheable: Clone + Send + Sync + 'static {
    /// Primary ID.
    fn cache_id(&self) -> &str;

    /// Every secondary key this entity should be reachable by.
    fn cache_keys(&self) -> Vec<CacheKey>;
}

/// Keyed in-memory index over one entity kind.
///
/// Implementations synchronize internally; every method is safe to call
/// from many tasks at once and never blocks on I/O.
pub trait EntityCache<T: Cacheable>: Send + Sync {
    /// Index `entity` by ID and all its secondary keys, replacing any
    /// previous entry with the same ID.
    fn put(&self, entity: T);

    /// Look up by primary ID.
    fn get_by_id(&self, id: &str) -> Option<T>;

    /// Look up by a secondary key.
    fn get_by_key(&self, key: &CacheKey) -> Option<T>;

    /// Drop the entry for `id` from every index it is reachable by.
    fn invalidate(&self, id: &str);
}

impl Cacheable for EmojiWithCategory {
    fn cache_id(&self) -> &str {
        &self.emoji.id
    }

    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![
            CacheKey::Uri(self.emoji.uri.clone()),
            CacheKey::shortcode_domain(&self.emoji.shortcode, self.emoji.domain.as_deref()),
            CacheKey::StaticUrl(self.emoji.image_static_url.clone()),
        ]
    }
}

impl Cacheable for emoji_category::Model {
    fn cache_id(&self) -> &str {
        &self.id
    }

    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![CacheKey::name(&self.name)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcode_domain_key_normalizes() {
        assert_eq!(
            CacheKey::shortcode_domain("BlobCat", None),
            CacheKey::shortcode_domain("blobcat", Some("")),
        );
        assert_ne!(
            CacheKey::shortcode_domain("blobcat", None),
            CacheKey::shortcode_domain("blobcat", Some("remote.example")),
        );
    }

    #[test]
    fn test_name_key_is_case_insensitive() {
        assert_eq!(CacheKey::name("Reactions"), CacheKey::name("reactions"));
    }
}
