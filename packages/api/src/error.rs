//! Errors raised by the HTTP handlers and the REST client, and their mapping
//! to JSON responses (`{ "error": "..." }`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Invalid REST path: {0}")]
    InvalidPath(String),
    #[error("Invalid REST base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("REST backend responded with status {status}")]
    Upstream { status: u16, body: String },
    #[error("REST request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Document(#[from] jsonapi::DocumentError),
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Http(_) | ApiError::Document(_) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidBaseUrl(_) | ApiError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let mut body = json!({ "error": self.to_string() });
        // Backend validation errors are forwarded so forms can show them.
        if let ApiError::Upstream { body: upstream, .. } = &self {
            body["details"] = match serde_json::from_str::<Value>(upstream) {
                Ok(parsed) => jsonapi::camel_keys(&parsed),
                Err(_) => Value::String(upstream.clone()),
            };
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upstream_error_response() {
        let err = ApiError::Upstream {
            status: 422,
            body: r#"{"errors":[{"source_pointer":"/data/attributes/name","detail":"can't be blank"}]}"#
                .to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "REST backend responded with status 422");
        assert_eq!(body["details"]["errors"][0]["sourcePointer"], "/data/attributes/name");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidPath("../x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream { status: 1000, body: String::new() }.status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
