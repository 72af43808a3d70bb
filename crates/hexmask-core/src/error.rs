//! Error types module
//!
//! `AppError` covers everything that can go wrong outside of a masking job: document
//! store access, upload validation and storage failures surfaced to the caller of an
//! upload. Failures inside a job use [`TransformError`](crate::TransformError) instead.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => AppError::NotFound("row not found".to_string()),
            SqlxError::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(db_err.message().to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(AppError::NotFound("asset".into()).is_not_found());
        assert!(!AppError::NotFound("asset".into()).is_conflict());
        assert!(AppError::Conflict("hex_images_asset_id_key".into()).is_conflict());
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = SqlxError::RowNotFound.into();
        assert!(err.is_not_found());

        let err: AppError = SqlxError::PoolTimedOut.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
