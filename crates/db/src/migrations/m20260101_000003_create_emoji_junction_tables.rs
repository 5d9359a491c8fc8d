//! Create status/account to emoji junction tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatusToEmojis::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StatusToEmojis::StatusId).string_len(32).not_null())
                    .col(ColumnDef::new(StatusToEmojis::EmojiId).string_len(32).not_null())
                    .primary_key(
                        Index::create()
                            .col(StatusToEmojis::StatusId)
                            .col(StatusToEmojis::EmojiId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_to_emojis_emoji")
                            .from(StatusToEmojis::Table, StatusToEmojis::EmojiId)
                            .to(Emojis::Table, Emojis::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountToEmojis::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountToEmojis::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(AccountToEmojis::EmojiId).string_len(32).not_null())
                    .primary_key(
                        Index::create()
                            .col(AccountToEmojis::AccountId)
                            .col(AccountToEmojis::EmojiId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_to_emojis_emoji")
                            .from(AccountToEmojis::Table, AccountToEmojis::EmojiId)
                            .to(Emojis::Table, Emojis::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: emoji_id (cascading delete scans by emoji)
        manager
            .create_index(
                Index::create()
                    .name("idx_status_to_emojis_emoji_id")
                    .table(StatusToEmojis::Table)
                    .col(StatusToEmojis::EmojiId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_account_to_emojis_emoji_id")
                    .table(AccountToEmojis::Table)
                    .col(AccountToEmojis::EmojiId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountToEmojis::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StatusToEmojis::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StatusToEmojis {
    Table,
    StatusId,
    EmojiId,
}

#[derive(Iden)]
enum AccountToEmojis {
    Table,
    AccountId,
    EmojiId,
}

#[derive(Iden)]
enum Emojis {
    Table,
    Id,
}
