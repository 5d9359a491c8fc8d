//! Database layer for fedimoji.
//!
//! `SeaORM` entities and migrations for custom emojis and their categories,
//! plus cache-aside repositories that keep an in-memory index consistent
//! with the backing store.

pub mod batch;
pub mod cache;
pub mod cascade;
pub mod dialect;
pub mod entities;
pub mod error;
pub mod listing;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

pub use cache::{CacheKey, Cacheable, EntityCache, MemoryCache};
pub use error::translate_db_error;
pub use listing::{EMOJI_ALL_DOMAINS, ListEmojisParams};
pub use repositories::{EmojiCategoryRepository, EmojiRepository, EmojiWithCategory};

use fedimoji_common::{AppError, Config};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(config.database.sqlx_logging)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(opt).await.map_err(translate_db_error)?;
    info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(translate_db_error)
}
