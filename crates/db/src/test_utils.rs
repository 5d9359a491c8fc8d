//! Test utilities for database operations.
//!
//! Provides a migrated throwaway database and model fixtures.

use chrono::{TimeZone, Utc};
use fedimoji_common::IdGenerator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{
    emoji, emoji_category, AccountToEmoji, Emoji, EmojiCategory, StatusToEmoji,
};
use crate::migrations::Migrator;

/// Environment variable that points tests at an external database.
pub const TEST_DATABASE_URL_ENV: &str = "FEDIMOJI_TEST_DATABASE_URL";

/// A migrated database for tests.
pub struct TestDatabase {
    /// Database connection.
    pub conn: DatabaseConnection,
}

impl TestDatabase {
    /// Private in-memory SQLite database with the schema applied.
    ///
    /// The pool is pinned to one connection; every SQLite connection would
    /// otherwise get its own empty in-memory database.
    pub async fn sqlite_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        Self::connect(opt).await
    }

    /// Use [`TEST_DATABASE_URL_ENV`] when set, otherwise in-memory SQLite.
    pub async fn from_env() -> Result<Self, DbErr> {
        match std::env::var(TEST_DATABASE_URL_ENV) {
            Ok(url) if !url.is_empty() => {
                let mut opt = ConnectOptions::new(url);
                opt.sqlx_logging(false);
                Self::connect(opt).await
            }
            _ => Self::sqlite_memory().await,
        }
    }

    async fn connect(opt: ConnectOptions) -> Result<Self, DbErr> {
        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!(backend = ?conn.get_database_backend(), "Test database ready");
        Ok(Self { conn })
    }

    /// Get the database connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Remove every row, junction tables first.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        StatusToEmoji::delete_many().exec(&self.conn).await?;
        AccountToEmoji::delete_many().exec(&self.conn).await?;
        Emoji::delete_many().exec(&self.conn).await?;
        EmojiCategory::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}

/// A fixed timestamp so fixtures compare equal after a storage round trip.
#[must_use]
pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// An enabled, picker-visible, uncategorized emoji.
///
/// URI and static URL are derived from `id` so they stay unique.
#[must_use]
pub fn emoji_model(id: &str, shortcode: &str, domain: Option<&str>) -> emoji::Model {
    let host = domain.unwrap_or("local.example");
    emoji::Model {
        id: id.to_string(),
        shortcode: shortcode.to_string(),
        domain: domain.map(str::to_string),
        created_at: fixed_time(),
        updated_at: fixed_time(),
        image_url: format!("https://{host}/files/{id}.png"),
        image_static_url: format!("https://{host}/files/{id}.static.png"),
        image_content_type: "image/png".to_string(),
        image_file_size: 1024,
        image_updated_at: fixed_time(),
        uri: format!("https://{host}/emoji/{id}"),
        disabled: false,
        visible_in_picker: true,
        category_id: None,
    }
}

/// [`emoji_model`] with a freshly generated ID.
#[must_use]
pub fn new_emoji_model(shortcode: &str, domain: Option<&str>) -> emoji::Model {
    emoji_model(&IdGenerator::new().generate(), shortcode, domain)
}

/// A category with fixed timestamps.
#[must_use]
pub fn category_model(id: &str, name: &str) -> emoji_category::Model {
    emoji_category::Model {
        id: id.to_string(),
        name: name.to_string(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}
