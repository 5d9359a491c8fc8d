//! Translation of `SeaORM` errors into the application taxonomy.

use fedimoji_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Normalize a backend error.
///
/// Unique-constraint violations become `AlreadyExists`, a missing record
/// becomes `NotFound`, and everything else is a generic `Database` error.
#[must_use]
pub fn translate_db_error(err: DbErr) -> AppError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return AppError::AlreadyExists(detail);
    }

    match err {
        DbErr::RecordNotFound(what) => AppError::NotFound(what),
        other => AppError::Database(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err = translate_db_error(DbErr::RecordNotFound("emoji e1".to_string()));
        assert!(matches!(err, AppError::NotFound(what) if what == "emoji e1"));
    }

    #[test]
    fn test_other_errors_map_to_database() {
        let err = translate_db_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Database(msg) if msg.contains("connection reset")));
    }
}
