//! Error types and API response structures

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with structured error code
///
/// `message` is what the caller sees. For system errors the message is
/// replaced by the code's generic text when the error becomes a response,
/// so internal detail only ever reaches the log.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Message safe to hand to an unauthenticated caller
    pub fn public_message(&self) -> &str {
        match self.code.category() {
            ErrorCategory::System => self.code.message(),
            _ => &self.message,
        }
    }
}

/// JSON body returned by the HTTP endpoints
///
/// Success bodies carry `message`, failures carry `error` (the browser
/// checkout reads `data.error`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ApiResponse {
    /// Create a success response
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
            code: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            message: None,
            error: Some(err.public_message().to_string()),
            code: Some(err.code.code()),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::error(&self);

        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        } else {
            tracing::warn!(code = %self.code, message = %self.message, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl axum::response::IntoResponse for ApiResponse {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code.and_then(|c| ErrorCode::try_from(c).ok()) {
            Some(code) => code.http_status(),
            None => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_error_hides_detail() {
        let err = AppError::with_message(ErrorCode::StoreError, "dynamodb: throttled on table x");
        let body = ApiResponse::error(&err);
        assert_eq!(
            body.error.as_deref(),
            Some("An internal server error occurred.")
        );
        assert_eq!(body.code, Some(9002));
    }

    #[test]
    fn test_client_error_keeps_message() {
        let err = AppError::invalid_request("total must be a number");
        let body = ApiResponse::error(&err);
        assert_eq!(body.error.as_deref(), Some("total must be a number"));
    }

    #[test]
    fn test_ok_body_shape() {
        let json = serde_json::to_value(ApiResponse::ok("Order processed successfully")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "message": "Order processed successfully" })
        );
    }
}
