//! Status-to-emoji junction entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links a status to a custom emoji used in it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status_to_emojis")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub status_id: String,

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
