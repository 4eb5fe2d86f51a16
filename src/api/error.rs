// Maps domain errors onto HTTP responses.
// Every failure body is `{"detail": "..."}`, the shape the GPT action
// schema already expects.

use crate::core::docs::DocsError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<DocsError> for ApiError {
    fn from(err: DocsError) -> Self {
        let status = match &err {
            DocsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DocsError::NotFound(_) => StatusCode::NOT_FOUND,
            DocsError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DocsError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            DocsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %err, "Request failed");
        } else {
            tracing::debug!(%status, error = %err, "Request rejected");
        }

        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
