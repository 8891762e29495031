//! Order intake errors
//!
//! [`IntakeError`] covers everything that ends a request early. It converts
//! into [`AppError`], which picks the status code and keeps internal detail
//! out of the response body.

use axum::response::{IntoResponse, Response};
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::publish::PublishError;
use crate::store::StoreError;
use crate::stripe::SignatureError;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("webhook rejected: {0}")]
    Signature(#[from] SignatureError),

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("total is not a valid amount: {0}")]
    InvalidTotal(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match &err {
            IntakeError::Signature(SignatureError::MissingSecret) => {
                AppError::with_message(ErrorCode::WebhookSecretMissing, err.to_string())
            }
            IntakeError::Signature(_) => {
                AppError::with_message(ErrorCode::InvalidSignature, err.to_string())
            }
            IntakeError::InvalidBody(_) => AppError::invalid_request(err.to_string()),
            IntakeError::InvalidTotal(_) => {
                AppError::with_message(ErrorCode::OrderInvalidTotal, err.to_string())
            }
            IntakeError::Store(_) => AppError::with_message(ErrorCode::StoreError, err.to_string()),
            IntakeError::Publish(_) => {
                AppError::with_message(ErrorCode::PublishError, err.to_string())
            }
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// Configuration errors (fatal at startup)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set in {environment} environment")]
    Missing {
        name: &'static str,
        environment: String,
    },

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use shared::ApiResponse;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (IntakeError::Signature(SignatureError::Mismatch), StatusCode::BAD_REQUEST),
            (IntakeError::Signature(SignatureError::MissingSecret), StatusCode::BAD_REQUEST),
            (IntakeError::InvalidTotal("abc".into()), StatusCode::BAD_REQUEST),
            (
                IntakeError::Store(StoreError::Dynamo("throttled".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::from(IntakeError::Publish(PublishError::Iot {
            topic: "printers/orders/print".into(),
            message: "AccessDenied: arn:aws:iot:...".into(),
        }));
        let body = ApiResponse::error(&err);
        assert_eq!(body.error.as_deref(), Some("An internal server error occurred."));
    }
}
