use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{commands, ports::database};

/// Errors reported to HTTP clients
///
/// Client errors carry their message verbatim. Internal errors only carry a generic message;
/// their detail is logged when the error is created.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<commands::Error> for ApiError {
    fn from(err: commands::Error) -> Self {
        match err {
            commands::Error::InvalidOrder(_) | commands::Error::InvalidAttribute(_) => {
                tracing::debug!(error = %err, "rejected request");
                ApiError::BadRequest(err.to_string())
            }
            commands::Error::LessonNotFound(_) => ApiError::NotFound(err.to_string()),
            commands::Error::Database(database::Error::NotReady) => {
                tracing::error!("database accessed before the connection was established");
                ApiError::Internal("Database not ready")
            }
            commands::Error::Database(err) => {
                tracing::error!(error = ?err, "database operation failed");
                ApiError::Internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "errorMsg": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
