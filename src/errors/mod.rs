//! Error handling module for the RSVP backend and client.
//!
//! Provides one error type shared by both halves, with mapping to HTTP status
//! codes and the response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const UPLOAD_ERROR: &str = "UPLOAD_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing required field or rejected file, detected before any write
    Validation(String),
    /// Update requested for a name that has no row
    NotFound(String),
    /// Non-success response status or network failure (client side)
    Transport(String),
    /// Backend-reported upload failure
    Upload(String),
    /// Malformed request
    BadRequest(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Transport(_) => codes::TRANSPORT_ERROR,
            AppError::Upload(_) => codes::UPLOAD_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Transport(msg) => msg.clone(),
            AppError::Upload(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Rebuild a typed error from an envelope's `code` and `error` fields.
    ///
    /// Unknown or missing codes are treated as transport failures, since the
    /// client cannot tell them apart from a misbehaving backend.
    pub fn from_code(code: Option<&str>, message: String) -> Self {
        match code {
            Some(codes::VALIDATION_ERROR) => AppError::Validation(message),
            Some(codes::NOT_FOUND) => AppError::NotFound(message),
            Some(codes::UPLOAD_ERROR) => AppError::Upload(message),
            Some(codes::BAD_REQUEST) => AppError::BadRequest(message),
            Some(codes::DATABASE_ERROR) => AppError::Database(message),
            Some(codes::INTERNAL_ERROR) => AppError::Internal(message),
            _ => AppError::Transport(message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!("Transport error: {:?}", err);
        AppError::Transport(format!("Request failed: {}", err))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::Validation(format!("Invalid base64 payload: {}", err))
    }
}

/// Payload placed in `data` when a request fails.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorData {
    pub error: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub data: ErrorData,
    pub timestamp: String,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let message = error.message();
        Self {
            success: false,
            data: ErrorData {
                error: message.clone(),
            },
            timestamp: crate::mapper::format_timestamp(chrono::Utc::now()),
            error: message,
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_code() {
        let errors = [
            AppError::Validation("v".into()),
            AppError::NotFound("n".into()),
            AppError::Upload("u".into()),
            AppError::BadRequest("b".into()),
            AppError::Database("d".into()),
            AppError::Internal("i".into()),
        ];
        for err in errors {
            let rebuilt = AppError::from_code(Some(err.error_code()), err.message());
            assert_eq!(rebuilt, err);
        }
    }

    #[test]
    fn test_unknown_code_is_transport() {
        let err = AppError::from_code(Some("SOMETHING_ELSE"), "boom".into());
        assert_eq!(err, AppError::Transport("boom".into()));
        let err = AppError::from_code(None, "boom".into());
        assert_eq!(err, AppError::Transport("boom".into()));
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse::new(&AppError::NotFound("RSVP not found for name: Zoe".into()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], "RSVP not found for name: Zoe");
        assert_eq!(json["data"]["error"], "RSVP not found for name: Zoe");
        assert!(json["timestamp"].is_string());
    }
}
