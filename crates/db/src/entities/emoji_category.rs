//! Emoji category entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named grouping for custom emojis.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emoji_categories")]
pub struct Model {
    /// Category ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Category name, unique case-insensitively.
    pub name: String,

    /// Created at timestamp.
    pub created_at: DateTime<Utc>,

    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Emoji category relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::emoji::Entity")]
    Emoji,
}

impl Related<super::emoji::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Emoji.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
