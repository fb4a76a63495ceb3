//! Error types for the everbloom-store crate.
//!
//! All persistence operations return [`StoreError`] via [`StoreResult`].
//! Read paths deliberately do *not* use these types: a missing or corrupt
//! namespace falls back to the caller-supplied default instead of erroring,
//! while writes always surface failures so data loss is never masked.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed (includes quota / disk-full conditions).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing an export file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A schema migration failed.
    #[error("migration v{version} failed: {message}")]
    Migration { version: u32, message: String },

    /// An import bundle was written by a newer application version.
    #[error("unsupported export format v{found} (this build supports up to v{supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}
