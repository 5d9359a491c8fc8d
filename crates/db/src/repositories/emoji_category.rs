//! Emoji category repository.

use std::sync::Arc;

use fedimoji_common::{AppError, AppResult, Context};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use tracing::instrument;

use crate::batch::hydrate;
use crate::cache::{get_or_load, CacheKey, EntityCache};
use crate::entities::{emoji_category, EmojiCategory};
use crate::error::translate_db_error;

/// Cache-aside repository for emoji categories.
#[derive(Clone)]
pub struct EmojiCategoryRepository {
    db: Arc<DatabaseConnection>,
    cache: Arc<dyn EntityCache<emoji_category::Model>>,
}

impl EmojiCategoryRepository {
    /// Create a new emoji category repository.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        cache: Arc<dyn EntityCache<emoji_category::Model>>,
    ) -> Self {
        Self { db, cache }
    }

    /// Insert a category and cache it.
    #[instrument(skip(self, ctx, category), fields(id = %category.id))]
    pub async fn put_emoji_category(
        &self,
        ctx: &Context,
        category: emoji_category::Model,
    ) -> AppResult<()> {
        let active: emoji_category::ActiveModel = category.clone().into();
        ctx.run(async {
            EmojiCategory::insert(active)
                .exec_without_returning(self.db.as_ref())
                .await
                .map_err(translate_db_error)
        })
        .await?;

        self.cache.put(category);
        Ok(())
    }

    /// All categories, ordered by name.
    pub async fn get_emoji_categories(
        &self,
        ctx: &Context,
    ) -> AppResult<Vec<emoji_category::Model>> {
        let ids: Vec<String> = ctx
            .run(async {
                EmojiCategory::find()
                    .select_only()
                    .column(emoji_category::Column::Id)
                    .order_by_asc(emoji_category::Column::Name)
                    .into_tuple::<String>()
                    .all(self.db.as_ref())
                    .await
                    .map_err(translate_db_error)
            })
            .await?;

        self.categories_from_ids(ctx, &ids).await
    }

    /// Find a category by ID.
    pub async fn get_emoji_category(
        &self,
        ctx: &Context,
        id: &str,
    ) -> AppResult<emoji_category::Model> {
        get_or_load(
            self.cache.as_ref(),
            || self.cache.get_by_id(id),
            || self.load(ctx, EmojiCategory::find_by_id(id), id),
        )
        .await
    }

    /// Find a category by name, case-insensitively.
    pub async fn get_emoji_category_by_name(
        &self,
        ctx: &Context,
        name: &str,
    ) -> AppResult<emoji_category::Model> {
        get_or_load(
            self.cache.as_ref(),
            || self.cache.get_by_key(&CacheKey::name(name)),
            || {
                let query = EmojiCategory::find().filter(
                    Expr::expr(Func::lower(Expr::col((
                        EmojiCategory,
                        emoji_category::Column::Name,
                    ))))
                    .eq(name.to_lowercase()),
                );
                self.load(ctx, query, name)
            },
        )
        .await
    }

    /// Resolve IDs to categories in order, skipping any that fail.
    pub async fn categories_from_ids(
        &self,
        ctx: &Context,
        ids: &[String],
    ) -> AppResult<Vec<emoji_category::Model>> {
        hydrate("emoji category", ids, move |id| async move {
            self.get_emoji_category(ctx, &id).await
        })
        .await
    }

    async fn load(
        &self,
        ctx: &Context,
        query: Select<EmojiCategory>,
        what: &str,
    ) -> AppResult<emoji_category::Model> {
        ctx.run(async {
            query
                .one(self.db.as_ref())
                .await
                .map_err(translate_db_error)?
                .ok_or_else(|| AppError::NotFound(format!("emoji category {what}")))
        })
        .await
    }
}
