//! Account-to-emoji junction entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links an account to a custom emoji in its profile.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_to_emojis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub emoji_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::emoji::Entity",
        from = "Column::EmojiId",
        to = "super::emoji::Column::Id"
    )]
    Emoji,
}

impl Related<super::emoji::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Emoji.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
