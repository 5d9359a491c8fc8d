//! Backend-specific SQL fragments.
//!
//! Emoji listings are ordered by `lower(shortcode || '@' || coalesce(domain, ''))`.
//! SQLite and `PostgreSQL` spell string concatenation differently, so the
//! expression is produced by a [`DialectStrategy`] chosen once per
//! repository from the connection's backend.

use std::fmt::Debug;
use std::sync::Arc;

use fedimoji_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::DatabaseBackend;

/// Produces the derived shortcode/domain sort key for one backend.
pub trait DialectStrategy: Debug + Send + Sync {
    /// Sort-key expression over two already-quoted column references.
    fn sort_key_expression(&self, shortcode_column: &str, domain_column: &str) -> SimpleExpr;
}

/// SQLite: `||` concatenation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl DialectStrategy for SqliteDialect {
    fn sort_key_expression(&self, shortcode_column: &str, domain_column: &str) -> SimpleExpr {
        Expr::cust(format!(
            "LOWER({shortcode_column} || '@' || COALESCE({domain_column}, ''))"
        ))
    }
}

/// `PostgreSQL`: `CONCAT(...)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl DialectStrategy for PostgresDialect {
    fn sort_key_expression(&self, shortcode_column: &str, domain_column: &str) -> SimpleExpr {
        Expr::cust(format!(
            "LOWER(CONCAT({shortcode_column}, '@', COALESCE({domain_column}, '')))"
        ))
    }
}

/// Pick the strategy for `backend`.
///
/// Any backend other than SQLite or `PostgreSQL` is a configuration error.
pub fn dialect_for(backend: DatabaseBackend) -> AppResult<Arc<dyn DialectStrategy>> {
    match backend {
        DatabaseBackend::Sqlite => Ok(Arc::new(SqliteDialect)),
        DatabaseBackend::Postgres => Ok(Arc::new(PostgresDialect)),
        other => Err(AppError::Config(format!(
            "unsupported database backend for emoji listings: {other:?}"
        ))),
    }
}

/// `"table"."column"`, quoted the way both supported backends expect.
#[must_use]
pub fn quoted_column(table: &str, column: &str) -> String {
    format!("\"{table}\".\"{column}\"")
}
