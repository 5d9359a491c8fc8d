//! Error types for fedimoji.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Storage-layer errors are always translated into one of these variants
/// before they leave a repository, so callers never see backend values.
#[derive(Debug, Error)]
pub enum AppError {
    // === Lookup outcomes ===
    #[error("Not found: {0}")]
    NotFound(String),

    /// A batch lookup was started from an empty ID set.
    #[error("No entries")]
    NoEntries,

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // === Execution control ===
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out")]
    Timeout,

    // === Server Errors ===
    /// A multi-step write was rolled back; no row was changed.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoEntries => "NO_ENTRIES",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
            Self::Transaction(_) => "TRANSACTION_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error means the row simply does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether the caller's context stopped the operation.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout)
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
