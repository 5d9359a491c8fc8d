//! Create emoji table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Emojis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Emojis::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Emojis::Shortcode).string_len(128).not_null())
                    .col(ColumnDef::new(Emojis::Domain).string_len(256))
                    .col(
                        ColumnDef::new(Emojis::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Emojis::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Emojis::ImageUrl).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(Emojis::ImageStaticUrl)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Emojis::ImageContentType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Emojis::ImageFileSize).integer().not_null())
                    .col(
                        ColumnDef::new(Emojis::ImageUpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Emojis::Uri)
                            .string_len(1024)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Emojis::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Emojis::VisibleInPicker)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Emojis::CategoryId).string_len(32))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emojis_category")
                            .from(Emojis::Table, Emojis::CategoryId)
                            .to(EmojiCategories::Table, EmojiCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (lower(shortcode), domain). Local emojis have a NULL
        // domain, which both backends treat as distinct, so it is coalesced.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_emojis_shortcode_domain \
                 ON emojis (LOWER(shortcode), COALESCE(domain, ''))",
            )
            .await?;

        // Index: domain (for filtering local/remote emojis)
        manager
            .create_index(
                Index::create()
                    .name("idx_emojis_domain")
                    .table(Emojis::Table)
                    .col(Emojis::Domain)
                    .to_owned(),
            )
            .await?;

        // Index: image_static_url (cache-aside lookup key)
        manager
            .create_index(
                Index::create()
                    .name("idx_emojis_image_static_url")
                    .table(Emojis::Table)
                    .col(Emojis::ImageStaticUrl)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Emojis::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Emojis {
    Table,
    Id,
    Shortcode,
    Domain,
    CreatedAt,
    UpdatedAt,
    ImageUrl,
    ImageStaticUrl,
    ImageContentType,
    ImageFileSize,
    ImageUpdatedAt,
    Uri,
    Disabled,
    VisibleInPicker,
    CategoryId,
}

#[derive(Iden)]
enum EmojiCategories {
    Table,
    Id,
}
