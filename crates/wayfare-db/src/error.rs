//! Database error types

use thiserror::Error;
use wayfare_types::ParseStateError;

/// Database operation errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Corrupt row: {0}")]
    Corrupt(#[from] ParseStateError),
}

impl DbError {
    /// Classify a sqlx error, pulling unique violations out as duplicates
    pub fn from_query(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unique constraint");
                return DbError::Duplicate(constraint.to_string());
            }
        }
        DbError::Query(e)
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;
