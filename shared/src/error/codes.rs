//! Unified error codes for the order services
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors (webhook signatures)
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Request body could not be read
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Webhook signature missing, malformed, stale or not matching
    InvalidSignature = 1001,
    /// No webhook signing secret configured
    WebhookSecretMissing = 1002,

    // ==================== 4xxx: Order ====================
    /// Order total could not be read as an amount
    OrderInvalidTotal = 4001,

    // ==================== 9xxx: System ====================
    /// Order store write failed
    StoreError = 9002,
    /// Topic publish failed
    PublishError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "Invalid request",

            ErrorCode::InvalidSignature => "Invalid webhook signature",
            ErrorCode::WebhookSecretMissing => "Invalid webhook signature",

            ErrorCode::OrderInvalidTotal => "Order total is not a valid amount",

            ErrorCode::StoreError => "An internal server error occurred.",
            ErrorCode::PublishError => "An internal server error occurred.",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(ErrorCode::InvalidRequest),

            1001 => Ok(ErrorCode::InvalidSignature),
            1002 => Ok(ErrorCode::WebhookSecretMissing),

            4001 => Ok(ErrorCode::OrderInvalidTotal),

            9002 => Ok(ErrorCode::StoreError),
            9003 => Ok(ErrorCode::PublishError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::InvalidRequest.code(), 5);
        assert_eq!(ErrorCode::InvalidSignature.code(), 1001);
        assert_eq!(ErrorCode::OrderInvalidTotal.code(), 4001);
        assert_eq!(ErrorCode::StoreError.code(), 9002);
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(9001), Err(InvalidErrorCode(9001)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::PublishError).unwrap();
        assert_eq!(json, "9003");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::PublishError);
    }

    #[test]
    fn test_system_messages_do_not_leak_detail() {
        for code in [ErrorCode::StoreError, ErrorCode::PublishError] {
            assert_eq!(code.message(), "An internal server error occurred.");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::StoreError.to_string(), "StoreError(9002)");
    }
}
