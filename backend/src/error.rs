//! The error type every handler returns.
//!
//! Whatever the variant, the response body has the same shape:
//! `{"code": <status>, "message": <text>, "details": <object|null>}`.
//! Storage and I/O failures are logged here and answered with a generic 500
//! so internal paths never reach clients.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Gone(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    GatewayTimeout(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn body(&self) -> (String, Option<Value>) {
        match self {
            ApiError::Database(e) => {
                error!("database failure: {}", e);
                (
                    "Internal Server Error".to_string(),
                    Some(json!({ "error": "database failure" })),
                )
            }
            ApiError::Io(e) => {
                error!("i/o failure: {}", e);
                (
                    "Internal Server Error".to_string(),
                    Some(json!({ "error": "storage failure" })),
                )
            }
            ApiError::Internal(msg) => {
                error!("unexpected failure: {}", msg);
                (
                    "Internal Server Error".to_string(),
                    Some(json!({ "error": msg })),
                )
            }
            other => (other.to_string(), None),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (message, details) = self.body();
        HttpResponse::build(status).json(json!({
            "code": status.as_u16(),
            "message": message,
            "details": details,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn error_body_has_code_message_details() {
        let resp = ApiError::Gone("Shared link has expired".into()).error_response();
        assert_eq!(resp.status(), StatusCode::GONE);
        let bytes = to_bytes(resp.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["code"], 410);
        assert_eq!(body["message"], "Shared link has expired");
        assert!(body["details"].is_null());
    }

    #[actix_web::test]
    async fn database_errors_are_masked() {
        let resp = ApiError::from(rusqlite::Error::InvalidQuery).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(resp.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["message"], "Internal Server Error");
    }
}
