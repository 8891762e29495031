//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 500 Internal Server Error
            Self::StoreError | Self::PublishError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (signature, payload errors)
            Self::InvalidRequest
            | Self::InvalidSignature
            | Self::WebhookSecretMissing
            | Self::OrderInvalidTotal => StatusCode::BAD_REQUEST,
        }
    }
}
