//! Custom emoji entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Custom emoji, either hosted locally or known from a remote instance.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "emojis")]
pub struct Model {
    /// Emoji ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Shortcode (e.g., "blobcat" for :blobcat:).
    pub shortcode: String,

    /// Domain this emoji originates from (null for local).
    pub domain: Option<String>,

    /// Created at timestamp.
    pub created_at: DateTime<Utc>,

    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,

    /// Original image URL.
    pub image_url: String,

    /// Static (non-animated) version URL.
    pub image_static_url: String,

    /// MIME type of the emoji image.
    pub image_content_type: String,

    /// File size in bytes.
    pub image_file_size: i32,

    /// When the image was last refreshed.
    pub image_updated_at: DateTime<Utc>,

    /// `ActivityPub` URI of this emoji.
    #[sea_orm(unique)]
    pub uri: String,

    /// Disabled emojis are hidden and unusable.
    pub disabled: bool,

    /// Whether this emoji shows up in the picker.
    pub visible_in_picker: bool,

    /// Category this emoji belongs to (nullable).
    pub category_id: Option<String>,
}

impl Model {
    /// Whether this emoji is hosted on this instance.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.domain.is_none()
    }

    /// Store local emojis with a NULL domain, never `""`.
    pub fn normalize_domain(&mut self) {
        if self.domain.as_deref().is_some_and(str::is_empty) {
            self.domain = None;
        }
    }
}

/// Emoji relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::emoji_category::Entity",
        from = "Column::CategoryId",
        to = "super::emoji_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,

    #[sea_orm(has_many = "super::status_to_emoji::Entity")]
    StatusToEmoji,

    #[sea_orm(has_many = "super::account_to_emoji::Entity")]
    AccountToEmoji,
}

impl Related<super::emoji_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::status_to_emoji::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusToEmoji.def()
    }
}

impl Related<super::account_to_emoji::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountToEmoji.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use crate::test_utils::emoji_model;

    #[test]
    fn test_normalize_domain_maps_empty_to_local() {
        let mut empty = emoji_model("e1", "blobcat", Some(""));
        assert!(!empty.is_local());
        empty.normalize_domain();
        assert!(empty.is_local());

        let mut remote = emoji_model("e2", "blobcat", Some("remote.example"));
        remote.normalize_domain();
        assert_eq!(remote.domain.as_deref(), Some("remote.example"));
    }
}
