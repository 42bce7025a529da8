//! Error types and HTTP error response handling.
//!
//! Services return a [`ServiceError`] carrying a machine-readable code, a
//! human message, and an optional wrapped cause. The HTTP layer converts the
//! code into a status and emits a flat `{"error", "message"}` JSON body.
//! Internal causes are logged server-side and never reach clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Machine-readable error codes as they appear in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCard,
    InvalidCvv,
    InvalidAmount,
    CardExpired,
    InsufficientFunds,
    AuthorizationNotFound,
    AuthorizationExpired,
    AuthorizationAlreadyUsed,
    AlreadyCaptured,
    AlreadyVoided,
    AlreadyRefunded,
    AmountMismatch,
    CaptureNotFound,
    NotFound,
    InternalError,
}

impl ErrorCode {
    /// The wire form of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidCard => "invalid_card",
            ErrorCode::InvalidCvv => "invalid_cvv",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::CardExpired => "card_expired",
            ErrorCode::InsufficientFunds => "insufficient_funds",
            ErrorCode::AuthorizationNotFound => "authorization_not_found",
            ErrorCode::AuthorizationExpired => "authorization_expired",
            ErrorCode::AuthorizationAlreadyUsed => "authorization_already_used",
            ErrorCode::AlreadyCaptured => "already_captured",
            ErrorCode::AlreadyVoided => "already_voided",
            ErrorCode::AlreadyRefunded => "already_refunded",
            ErrorCode::AmountMismatch => "amount_mismatch",
            ErrorCode::CaptureNotFound => "capture_not_found",
            ErrorCode::NotFound => "not_found",
            ErrorCode::InternalError => "internal_error",
        }
    }

    /// HTTP status for the code.
    ///
    /// Business-rule rejections are 400 except `insufficient_funds`, which
    /// is 402 so non-retryable declines are distinguishable by status alone.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// A business-logic error with a code, message, and optional cause.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an unexpected failure. The cause is retained for logging; the
    /// client-facing message stays fixed.
    pub fn internal(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: "internal error".to_string(),
            source: Some(source.into()),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::internal(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        // Internal details are logged here and replaced with a fixed
        // message on the wire.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, cause = ?self.source, "internal error");
            "internal error".to_string()
        } else {
            self.message
        };

        let body = Json(json!({
            "error": self.code.as_str(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::InvalidCard.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidCvv.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AmountMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InsufficientFunds.status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::InternalError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn wire_codes() {
        assert_eq!(ErrorCode::AuthorizationAlreadyUsed.as_str(), "authorization_already_used");
        assert_eq!(ErrorCode::AlreadyCaptured.as_str(), "already_captured");
        assert_eq!(ErrorCode::CardExpired.as_str(), "card_expired");
    }

    #[test]
    fn internal_error_hides_cause_message() {
        let err = ServiceError::internal(std::io::Error::other("connection reset by peer"));
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, "internal error");
        assert!(err.source.is_some());
    }

    #[test]
    fn display_uses_message() {
        let err = ServiceError::new(ErrorCode::InvalidCvv, "CVV does not match");
        assert_eq!(err.to_string(), "CVV does not match");
    }
}
