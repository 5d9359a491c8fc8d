//! Filtered, cursor-bounded emoji listings.
//!
//! Listings are ordered by the derived sort key `shortcode@domain`
//! (lowercased, see [`crate::dialect`]). Paging forward bounds the key from
//! below. Paging backward bounds it from above and scans in descending
//! order so `limit` picks the rows nearest the cursor; the IDs are then
//! reversed, so callers always see ascending order.

use sea_orm::sea_query::{Expr, Func, Order};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityName, EntityTrait, IdenStatic, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use crate::dialect::{quoted_column, DialectStrategy};
use crate::entities::{emoji, Emoji};

/// Reserved `domain` value meaning "do not filter by domain".
pub const EMOJI_ALL_DOMAINS: &str = "*";

/// Domain filter derived from the `domain` listing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainFilter {
    /// Only local emojis (`domain IS NULL`).
    Local,
    /// No domain restriction.
    All,
    /// Emojis from exactly this domain.
    Exact(String),
}

impl DomainFilter {
    /// `""` means local, [`EMOJI_ALL_DOMAINS`] means all, anything else is exact.
    #[must_use]
    pub fn from_param(domain: &str) -> Self {
        match domain {
            "" => Self::Local,
            EMOJI_ALL_DOMAINS => Self::All,
            other => Self::Exact(other.to_string()),
        }
    }
}

/// Parameters for an emoji listing.
#[derive(Debug, Clone, Default)]
pub struct ListEmojisParams {
    /// `""` = local only, [`EMOJI_ALL_DOMAINS`] = any, otherwise an exact domain.
    pub domain: String,
    /// Include disabled emojis.
    pub include_disabled: bool,
    /// Include enabled emojis.
    pub include_enabled: bool,
    /// Case-insensitive exact shortcode match.
    pub shortcode: Option<String>,
    /// Forward cursor: only keys strictly greater than this.
    pub max_shortcode_domain: Option<String>,
    /// Backward cursor: only keys strictly less than this.
    pub min_shortcode_domain: Option<String>,
    /// Row cap applied to the query.
    pub limit: Option<u64>,
}

impl ListEmojisParams {
    /// All emojis on every domain, enabled or not.
    #[must_use]
    pub fn all_domains() -> Self {
        Self {
            domain: EMOJI_ALL_DOMAINS.to_string(),
            ..Self::default()
        }
    }

    /// `Some(true)` for disabled-only, `Some(false)` for enabled-only,
    /// `None` when both or neither flag is set.
    #[must_use]
    pub const fn disabled_filter(&self) -> Option<bool> {
        match (self.include_disabled, self.include_enabled) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    /// Whether the query runs in descending order and needs reversing.
    #[must_use]
    pub fn pages_backward(&self) -> bool {
        non_empty(self.min_shortcode_domain.as_deref()).is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the ID-only listing query.
#[must_use]
pub fn emoji_ids_query(
    dialect: &dyn DialectStrategy,
    params: &ListEmojisParams,
) -> Select<Emoji> {
    let entity = Emoji;
    let table = entity.table_name();
    let sort_key = dialect.sort_key_expression(
        &quoted_column(table, emoji::Column::Shortcode.as_str()),
        &quoted_column(table, emoji::Column::Domain.as_str()),
    );

    let mut query = Emoji::find().select_only().column(emoji::Column::Id);

    query = match DomainFilter::from_param(&params.domain) {
        DomainFilter::Local => query.filter(emoji::Column::Domain.is_null()),
        DomainFilter::All => query,
        DomainFilter::Exact(domain) => query.filter(emoji::Column::Domain.eq(domain)),
    };

    if let Some(disabled) = params.disabled_filter() {
        query = query.filter(emoji::Column::Disabled.eq(disabled));
    }

    if let Some(shortcode) = non_empty(params.shortcode.as_deref()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((Emoji, emoji::Column::Shortcode))))
                .eq(shortcode.to_lowercase()),
        );
    }

    if let Some(cursor) = non_empty(params.max_shortcode_domain.as_deref()) {
        query = query.filter(Expr::expr(sort_key.clone()).gt(cursor.to_lowercase()));
    }

    let order = if let Some(cursor) = non_empty(params.min_shortcode_domain.as_deref()) {
        query = query.filter(Expr::expr(sort_key.clone()).lt(cursor.to_lowercase()));
        Order::Desc
    } else {
        Order::Asc
    };

    query = query.order_by(sort_key, order);

    if let Some(limit) = params.limit.filter(|l| *l > 0) {
        query = query.limit(limit);
    }

    query
}

/// Run the listing and return IDs in ascending sort-key order.
pub async fn list_emoji_ids<C: ConnectionTrait>(
    db: &C,
    dialect: &dyn DialectStrategy,
    params: &ListEmojisParams,
) -> Result<Vec<String>, DbErr> {
    let mut ids = emoji_ids_query(dialect, params)
        .into_tuple::<String>()
        .all(db)
        .await?;

    if params.pages_backward() {
        ids.reverse();
    }

    Ok(ids)
}

/// IDs of emojis offered in the local picker: visible, enabled, local,
/// ordered by shortcode.
pub async fn list_useable_emoji_ids<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, DbErr> {
    Emoji::find()
        .select_only()
        .column(emoji::Column::Id)
        .filter(emoji::Column::VisibleInPicker.eq(true))
        .filter(emoji::Column::Disabled.eq(false))
        .filter(emoji::Column::Domain.is_null())
        .order_by_asc(emoji::Column::Shortcode)
        .into_tuple::<String>()
        .all(db)
        .await
}
