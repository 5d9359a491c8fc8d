//! Cache-aside repositories.

pub mod emoji;
pub mod emoji_category;

pub use emoji::{EmojiRepository, EmojiWithCategory};
pub use emoji_category::EmojiCategoryRepository;
