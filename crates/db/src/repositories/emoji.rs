//! Emoji repository.
//!
//! Reads go through the emoji cache first; misses are loaded from storage
//! together with the emoji's category and then cached. Writes invalidate
//! or repopulate the cache only after storage has accepted them.

use std::sync::Arc;

use chrono::Utc;
use fedimoji_common::{AppError, AppResult, Context};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    Iterable, ModelTrait, QueryFilter, Select,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::EmojiCategoryRepository;
use crate::batch::hydrate;
use crate::cache::{get_or_load, CacheKey, EntityCache};
use crate::cascade::emoji_cascade;
use crate::dialect::{dialect_for, DialectStrategy};
use crate::entities::{emoji, emoji_category, Emoji};
use crate::error::translate_db_error;
use crate::listing::{list_emoji_ids, list_useable_emoji_ids, ListEmojisParams};

/// An emoji with its category loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiWithCategory {
    /// The emoji row.
    pub emoji: emoji::Model,
    /// The referenced category, if any.
    pub category: Option<emoji_category::Model>,
}

impl EmojiWithCategory {
    /// Wrap an emoji that has no category.
    #[must_use]
    pub const fn uncategorized(emoji: emoji::Model) -> Self {
        Self {
            emoji,
            category: None,
        }
    }

    /// Whether `category` matches `emoji.category_id`.
    #[must_use]
    pub fn category_consistent(&self) -> bool {
        self.emoji.category_id.as_deref() == self.category.as_ref().map(|c| c.id.as_str())
    }
}

/// Emoji repository for database operations.
#[derive(Clone)]
pub struct EmojiRepository {
    db: Arc<DatabaseConnection>,
    dialect: Arc<dyn DialectStrategy>,
    cache: Arc<dyn EntityCache<EmojiWithCategory>>,
    categories: EmojiCategoryRepository,
}

impl EmojiRepository {
    /// Create a new emoji repository.
    ///
    /// Fails with a configuration error if the connection's backend has no
    /// sort-key dialect.
    pub fn new(
        db: Arc<DatabaseConnection>,
        cache: Arc<dyn EntityCache<EmojiWithCategory>>,
        categories: EmojiCategoryRepository,
    ) -> AppResult<Self> {
        let dialect = dialect_for(db.get_database_backend())?;
        Ok(Self {
            db,
            dialect,
            cache,
            categories,
        })
    }

    /// The category repository this repository loads categories through.
    #[must_use]
    pub const fn categories(&self) -> &EmojiCategoryRepository {
        &self.categories
    }

    /// Insert an emoji. An empty domain is stored as local.
    ///
    /// The emoji is cached only when `category` matches `category_id`;
    /// otherwise the next read loads it with its category.
    #[instrument(skip(self, ctx, emoji), fields(id = %emoji.emoji.id))]
    pub async fn put_emoji(&self, ctx: &Context, mut emoji: EmojiWithCategory) -> AppResult<()> {
        emoji.emoji.normalize_domain();
        let active: emoji::ActiveModel = emoji.emoji.clone().into();
        ctx.run(async {
            Emoji::insert(active)
                .exec_without_returning(self.db.as_ref())
                .await
                .map_err(translate_db_error)
        })
        .await?;

        if emoji.category_consistent() {
            self.cache.put(emoji);
        }
        Ok(())
    }

    /// Write `columns` of `emoji` (plus `updated_at`) and invalidate its
    /// cache entry. An empty column list writes every non-key column.
    ///
    /// Returns the emoji with its refreshed `updated_at`.
    #[instrument(skip(self, ctx, emoji, columns), fields(id = %emoji.id))]
    pub async fn update_emoji(
        &self,
        ctx: &Context,
        mut emoji: emoji::Model,
        columns: &[emoji::Column],
    ) -> AppResult<emoji::Model> {
        emoji.updated_at = Utc::now();
        emoji.normalize_domain();

        let mut active = emoji::ActiveModel {
            id: ActiveValue::Unchanged(emoji.id.clone()),
            ..Default::default()
        };
        let all_columns: Vec<emoji::Column>;
        let columns = if columns.is_empty() {
            all_columns = emoji::Column::iter()
                .filter(|c| !matches!(c, emoji::Column::Id))
                .collect();
            all_columns.as_slice()
        } else {
            columns
        };
        for column in columns.iter().chain(std::iter::once(&emoji::Column::UpdatedAt)) {
            if !matches!(column, emoji::Column::Id) {
                active.set(*column, emoji.get(*column));
            }
        }

        let result = ctx
            .run(async {
                Emoji::update_many()
                    .set(active)
                    .filter(emoji::Column::Id.eq(emoji.id.as_str()))
                    .exec(self.db.as_ref())
                    .await
                    .map_err(translate_db_error)
            })
            .await?;

        self.cache.invalidate(&emoji.id);

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("emoji {}", emoji.id)));
        }
        Ok(emoji)
    }

    /// Delete an emoji and every junction row that references it, atomically.
    ///
    /// The cache entry is dropped after the transaction commits. A rolled
    /// back delete leaves it in place. When the context fires first the
    /// commit may or may not have landed, so the entry is dropped and the
    /// next read goes to storage.
    #[instrument(skip(self, ctx))]
    pub async fn delete_emoji_by_id(&self, ctx: &Context, id: &str) -> AppResult<()> {
        match ctx.run(emoji_cascade(id).execute(self.db.as_ref())).await {
            Ok(removed) => {
                self.cache.invalidate(id);
                info!(id, rows = removed, "Deleted emoji");
                Ok(())
            }
            Err(err) if err.is_interrupted() => {
                self.cache.invalidate(id);
                warn!(id, error = %err, "Delete interrupted, outcome unknown");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// List emojis by domain, enabled state and shortcode with cursor paging.
    ///
    /// Results are always in ascending `shortcode@domain` order.
    pub async fn get_emojis(
        &self,
        ctx: &Context,
        params: &ListEmojisParams,
    ) -> AppResult<Vec<EmojiWithCategory>> {
        let ids = ctx
            .run(async {
                list_emoji_ids(self.db.as_ref(), self.dialect.as_ref(), params)
                    .await
                    .map_err(translate_db_error)
            })
            .await?;

        self.emojis_from_ids(ctx, &ids).await
    }

    /// Local, enabled, picker-visible emojis ordered by shortcode.
    pub async fn get_useable_emojis(&self, ctx: &Context) -> AppResult<Vec<EmojiWithCategory>> {
        let ids = ctx
            .run(async {
                list_useable_emoji_ids(self.db.as_ref())
                    .await
                    .map_err(translate_db_error)
            })
            .await?;

        self.emojis_from_ids(ctx, &ids).await
    }

    /// Find an emoji by ID.
    pub async fn get_emoji_by_id(&self, ctx: &Context, id: &str) -> AppResult<EmojiWithCategory> {
        get_or_load(
            self.cache.as_ref(),
            || self.cache.get_by_id(id),
            || self.load(ctx, Emoji::find_by_id(id), id),
        )
        .await
    }

    /// Find an emoji by its `ActivityPub` URI.
    pub async fn get_emoji_by_uri(&self, ctx: &Context, uri: &str) -> AppResult<EmojiWithCategory> {
        get_or_load(
            self.cache.as_ref(),
            || self.cache.get_by_key(&CacheKey::Uri(uri.to_string())),
            || self.load(ctx, Emoji::find().filter(emoji::Column::Uri.eq(uri)), uri),
        )
        .await
    }

    /// Find an emoji by shortcode (case-insensitive) and domain.
    /// An empty `domain` means a local emoji.
    pub async fn get_emoji_by_shortcode_domain(
        &self,
        ctx: &Context,
        shortcode: &str,
        domain: &str,
    ) -> AppResult<EmojiWithCategory> {
        get_or_load(
            self.cache.as_ref(),
            || {
                self.cache
                    .get_by_key(&CacheKey::shortcode_domain(shortcode, Some(domain)))
            },
            || {
                let query = Emoji::find().filter(
                    Expr::expr(Func::lower(Expr::col((Emoji, emoji::Column::Shortcode))))
                        .eq(shortcode.to_lowercase()),
                );
                let query = if domain.is_empty() {
                    query.filter(emoji::Column::Domain.is_null())
                } else {
                    query.filter(emoji::Column::Domain.eq(domain))
                };
                self.load(ctx, query, shortcode)
            },
        )
        .await
    }

    /// Find an emoji by its static image URL.
    pub async fn get_emoji_by_static_url(
        &self,
        ctx: &Context,
        image_static_url: &str,
    ) -> AppResult<EmojiWithCategory> {
        get_or_load(
            self.cache.as_ref(),
            || {
                self.cache
                    .get_by_key(&CacheKey::StaticUrl(image_static_url.to_string()))
            },
            || {
                let query =
                    Emoji::find().filter(emoji::Column::ImageStaticUrl.eq(image_static_url));
                self.load(ctx, query, image_static_url)
            },
        )
        .await
    }

    /// Resolve IDs to emojis in order, skipping any that fail.
    pub async fn emojis_from_ids(
        &self,
        ctx: &Context,
        ids: &[String],
    ) -> AppResult<Vec<EmojiWithCategory>> {
        hydrate("emoji", ids, move |id| async move {
            self.get_emoji_by_id(ctx, &id).await
        })
        .await
    }

    async fn load(
        &self,
        ctx: &Context,
        query: Select<Emoji>,
        what: &str,
    ) -> AppResult<EmojiWithCategory> {
        let emoji = ctx
            .run(async {
                query
                    .one(self.db.as_ref())
                    .await
                    .map_err(translate_db_error)?
                    .ok_or_else(|| AppError::NotFound(format!("emoji {what}")))
            })
            .await?;

        let category = match emoji.category_id.as_deref() {
            None => None,
            Some(category_id) => {
                match self.categories.get_emoji_category(ctx, category_id).await {
                    Ok(category) => Some(category),
                    Err(err) if err.is_not_found() => {
                        warn!(id = %emoji.id, category_id, "Emoji references a missing category");
                        None
                    }
                    Err(err) => return Err(err),
                }
            }
        };

        Ok(EmojiWithCategory { emoji, category })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::test_utils::{category_model, emoji_model};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Value};

    struct Fixture {
        repo: EmojiRepository,
        cache: Arc<MemoryCache<EmojiWithCategory>>,
        category_cache: Arc<MemoryCache<emoji_category::Model>>,
    }

    fn fixture(db: MockDatabase) -> Fixture {
        let db = Arc::new(db.into_connection());
        let cache = Arc::new(MemoryCache::new());
        let category_cache = Arc::new(MemoryCache::new());
        let categories = EmojiCategoryRepository::new(db.clone(), category_cache.clone());
        let repo = EmojiRepository::new(db, cache.clone(), categories).unwrap();
        Fixture {
            repo,
            cache,
            category_cache,
        }
    }

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_put_then_get_skips_storage() {
        let emoji = emoji_model("e1", "blobcat", None);
        // Only the insert is queued; any read would exhaust the mock.
        let f = fixture(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec(1)]));
        let ctx = Context::background();

        f.repo
            .put_emoji(&ctx, EmojiWithCategory::uncategorized(emoji.clone()))
            .await
            .unwrap();

        let by_id = f.repo.get_emoji_by_id(&ctx, "e1").await.unwrap();
        let by_uri = f.repo.get_emoji_by_uri(&ctx, &emoji.uri).await.unwrap();
        let by_code = f
            .repo
            .get_emoji_by_shortcode_domain(&ctx, "BlobCat", "")
            .await
            .unwrap();
        let by_static = f
            .repo
            .get_emoji_by_static_url(&ctx, &emoji.image_static_url)
            .await
            .unwrap();

        for found in [by_id, by_uri, by_code, by_static] {
            assert_eq!(found.emoji, emoji);
        }
    }

    #[tokio::test]
    async fn test_get_by_id_loads_once() {
        let emoji = emoji_model("e1", "blobcat", None);
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[emoji.clone()]]),
        );
        let ctx = Context::background();

        assert_eq!(f.repo.get_emoji_by_id(&ctx, "e1").await.unwrap().emoji, emoji);
        assert_eq!(f.repo.get_emoji_by_id(&ctx, "e1").await.unwrap().emoji, emoji);
        assert_eq!(f.cache.len(), 1);
    }

    #[tokio::test]
    async fn test_load_resolves_category_through_category_cache() {
        let mut emoji = emoji_model("e1", "blobcat", None);
        emoji.category_id = Some("c1".to_string());
        let category = category_model("c1", "Blobs");
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[emoji.clone()]])
                .append_query_results([[category.clone()]]),
        );

        let found = f
            .repo
            .get_emoji_by_id(&Context::background(), "e1")
            .await
            .unwrap();

        assert_eq!(found.category, Some(category));
        assert!(f.category_cache.get_by_id("c1").is_some());
    }

    #[tokio::test]
    async fn test_dangling_category_loads_without_category() {
        let mut emoji = emoji_model("e1", "blobcat", None);
        emoji.category_id = Some("gone".to_string());
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[emoji.clone()]])
                .append_query_results([Vec::<emoji_category::Model>::new()]),
        );

        let found = f
            .repo
            .get_emoji_by_id(&Context::background(), "e1")
            .await
            .unwrap();

        assert_eq!(found.emoji, emoji);
        assert!(found.category.is_none());
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
        );

        let result = f.repo.get_emoji_by_id(&Context::background(), "e1").await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_update_invalidates_and_next_read_reloads() {
        let emoji = emoji_model("e1", "blobcat", None);
        let mut disabled = emoji.clone();
        disabled.disabled = true;

        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[emoji.clone()]])
                .append_exec_results([exec(1)])
                .append_query_results([[disabled.clone()]]),
        );
        let ctx = Context::background();

        assert!(!f.repo.get_emoji_by_id(&ctx, "e1").await.unwrap().emoji.disabled);

        let before = emoji.updated_at;
        let updated = f
            .repo
            .update_emoji(&ctx, disabled.clone(), &[emoji::Column::Disabled])
            .await
            .unwrap();
        assert!(updated.updated_at >= before);
        assert!(f.cache.get_by_id("e1").is_none());

        assert!(f.repo.get_emoji_by_id(&ctx, "e1").await.unwrap().emoji.disabled);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let f = fixture(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec(0)]));

        let result = f
            .repo
            .update_emoji(
                &Context::background(),
                emoji_model("ghost", "ghost", None),
                &[],
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_invalidates_after_commit() {
        let emoji = emoji_model("e1", "blobcat", None);
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0), exec(1)]),
        );
        f.cache.put(EmojiWithCategory::uncategorized(emoji));

        f.repo
            .delete_emoji_by_id(&Context::background(), "e1")
            .await
            .unwrap();

        assert!(f.cache.get_by_id("e1").is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_cache_untouched() {
        let emoji = emoji_model("e1", "blobcat", None);
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .append_exec_errors([DbErr::Custom("injected".to_string())]),
        );
        f.cache.put(EmojiWithCategory::uncategorized(emoji.clone()));

        let result = f
            .repo
            .delete_emoji_by_id(&Context::background(), "e1")
            .await;

        assert!(matches!(result, Err(AppError::Transaction(_))));
        assert_eq!(f.cache.get_by_id("e1").unwrap().emoji, emoji);
    }

    #[tokio::test]
    async fn test_interrupted_delete_drops_cache_entry() {
        let f = fixture(MockDatabase::new(DatabaseBackend::Postgres));
        f.cache
            .put(EmojiWithCategory::uncategorized(emoji_model("e1", "blobcat", None)));
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let result = f.repo.delete_emoji_by_id(&ctx, "e1").await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(f.cache.get_by_id("e1").is_none());
    }

    #[tokio::test]
    async fn test_put_stores_empty_domain_as_local() {
        let f = fixture(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([exec(1)]));

        f.repo
            .put_emoji(
                &Context::background(),
                EmojiWithCategory::uncategorized(emoji_model("e1", "blobcat", Some(""))),
            )
            .await
            .unwrap();

        let cached = f.cache.get_by_id("e1").unwrap();
        assert!(cached.emoji.is_local());
    }

    #[tokio::test]
    async fn test_get_emojis_empty_listing_is_no_entries() {
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()]),
        );

        let result = f
            .repo
            .get_emojis(&Context::background(), &ListEmojisParams::all_domains())
            .await;

        assert!(matches!(result, Err(AppError::NoEntries)));
    }

    #[tokio::test]
    async fn test_hydration_skips_unresolvable_ids() {
        let e1 = emoji_model("e1", "blobcat", None);
        let e3 = emoji_model("e3", "blobfox", None);
        let f = fixture(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! { "id" => Value::from("e1") },
                    maplit::btreemap! { "id" => Value::from("e2") },
                    maplit::btreemap! { "id" => Value::from("e3") },
                ]])
                .append_query_results([[e1.clone()]])
                .append_query_results([Vec::<emoji::Model>::new()])
                .append_query_results([[e3.clone()]]),
        );

        let found = f
            .repo
            .get_useable_emojis(&Context::background())
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|e| e.emoji.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e3"]);
    }

    #[test]
    fn test_mysql_backend_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::MySql).into_connection());
        let categories = EmojiCategoryRepository::new(db.clone(), Arc::new(MemoryCache::new()));

        let result = EmojiRepository::new(db, Arc::new(MemoryCache::new()), categories);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
