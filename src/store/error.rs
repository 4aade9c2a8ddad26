use thiserror::Error;

use crate::model::BookValidationError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Task join error: {0}")]
    TaskJoin(String),

    #[error(transparent)]
    Validation(#[from] BookValidationError),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

impl From<bb8::RunError<StoreError>> for StoreError {
    fn from(err: bb8::RunError<StoreError>) -> Self {
        match err {
            bb8::RunError::User(err) => err,
            bb8::RunError::TimedOut => Self::Pool("timed out waiting for a connection".to_string()),
        }
    }
}
