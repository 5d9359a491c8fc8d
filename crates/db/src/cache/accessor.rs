//! Cache-aside read path shared by every entity kind.

use std::future::Future;

use fedimoji_common::AppResult;
use tracing::debug;

use super::{Cacheable, EntityCache};

/// Return the cached entity, or load it from storage and cache it.
///
/// A failed load is returned as-is and leaves the cache untouched. There is
/// no single-flight: two concurrent misses may both run `load` and both
/// `put` the same entity, which is harmless because loads are read-only.
pub async fn get_or_load<T, G, L, Fut>(
    cache: &dyn EntityCache<T>,
    cache_get: G,
    load: L,
) -> AppResult<T>
where
    T: Cacheable,
    G: FnOnce() -> Option<T>,
    L: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if let Some(hit) = cache_get() {
        debug!(id = hit.cache_id(), "Cache hit");
        return Ok(hit);
    }

    let loaded = load().await?;
    debug!(id = loaded.cache_id(), "Cache miss, loaded from storage");

    cache.put(loaded.clone());
    Ok(loaded)
}
