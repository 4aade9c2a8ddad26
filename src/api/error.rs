//! Errors surfaced to HTTP clients.

use thiserror::Error;
use tracing::error;

use crate::http::response::{Response, StatusCode};
use crate::model::BookValidationError;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // 4xx
    #[error(transparent)]
    Validation(#[from] BookValidationError),

    #[error("Invalid book id: {0}")]
    InvalidId(String),

    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Book not found")]
    NotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    // 5xx
    #[error("{0}")]
    Storage(StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId(_) | ApiError::InvalidJson(_) => {
                StatusCode::BadRequest
            }
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NotFound,
            ApiError::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            ApiError::Storage(_) => StatusCode::InternalServerError,
        }
    }

    /// Renders the error as `{"error": message}`.
    pub fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            error!(error = %err, "Storage operation failed");
        }

        let response = Response::error(self.status_code(), &self.to_string());
        match self {
            ApiError::MethodNotAllowed { allow } => response.with_header("Allow", allow),
            _ => response,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(err) => ApiError::Validation(err),
            other => ApiError::Storage(other),
        }
    }
}
