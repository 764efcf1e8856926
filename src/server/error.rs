//! JSON error responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::vocab::{StoreError, ValidationError};

/// An error returned to the client as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    /// The database backend failed.
    BadGateway(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m)
            | ApiError::BadGateway(m) => m,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self.message());
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Validation(e) => ApiError::BadRequest(e.0),
            StoreError::Unauthorized(m) => ApiError::Unauthorized(format!("Authentication failed: {}", m)),
            StoreError::Backend(m) => ApiError::BadGateway(format!("Backend request failed: {}", m)),
            StoreError::Conflict(m) => ApiError::Conflict(m),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err = ApiError::from(StoreError::NotFound("Word pair".to_string()));
        assert_eq!(err, ApiError::NotFound("Word pair not found".to_string()));

        let err = ApiError::from(StoreError::Backend("timeout".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.message(), "Backend request failed: timeout");

        let err = ApiError::from(StoreError::Validation(ValidationError("bad".to_string())));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(StoreError::Conflict("busy".to_string()));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "busy");
    }

    #[tokio::test]
    async fn test_response_body() {
        let response = ApiError::unauthorized("Authorization header is required").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"error": "Authorization header is required"}));
    }
}
