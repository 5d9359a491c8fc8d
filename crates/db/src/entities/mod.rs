//! `SeaORM` entities.

pub mod account_to_emoji;
pub mod emoji;
pub mod emoji_category;
pub mod status_to_emoji;

pub use account_to_emoji::Entity as AccountToEmoji;
pub use emoji::Entity as Emoji;
pub use emoji_category::Entity as EmojiCategory;
pub use status_to_emoji::Entity as StatusToEmoji;
