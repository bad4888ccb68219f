//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::cache::CacheError;
use crate::messaging::PublishError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Card does not belong to account {0}")]
    CardNotOwned(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

impl AppError {
    /// Check if this is a server-side failure
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::Storage(_) | AppError::Publish(_) | AppError::Cache(_)
        )
    }
}

// Extractor rejections are client errors with the regular error body

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::Domain(domain_err) => {
                (StatusCode::BAD_REQUEST, domain_err.error_code(), Some(domain_err.to_string()))
            }

            // 403 Forbidden
            AppError::CardNotOwned(_) => {
                (StatusCode::FORBIDDEN, "card_not_owned", None)
            }

            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.clone()))
            }

            // 422 Unprocessable Entity
            AppError::InvalidReference(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_reference", Some(msg.clone()))
            }

            // 500 Internal Server Error
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Publish(e) => {
                tracing::error!("Publish error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "publish_error", None)
            }
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "cache_error", None)
            }
        };

        // Server-side failures never leak backend details
        let error = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
