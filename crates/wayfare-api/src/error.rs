//! API error handling
//!
//! Every failure leaves the API as `{"error": {"kind": ..., "message": ...}}`
//! with a status code derived from the kind. Gateway failures map onto 4xx/5xx
//! by their taxonomy; internal detail never reaches the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wayfare_booking::BookingError;
use wayfare_gateway::GatewayError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API-surface errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or malformed identity headers")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment processor rejected the request: {0}")]
    PaymentRejected(String),

    #[error("Payment processor unavailable")]
    PaymentUnavailable,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Stable machine-readable kind for the response body
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::PaymentRejected(_) => "payment_rejected",
            Self::PaymentUnavailable => "payment_unavailable",
            Self::Internal => "internal_error",
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PaymentUnavailable => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => Self::Validation(msg),
            BookingError::NotFound(what) => Self::NotFound(what),
            BookingError::Forbidden => Self::Forbidden,
            BookingError::Conflict(msg) => Self::Conflict(msg),
            BookingError::Gateway(g) => g.into(),
            BookingError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                Self::Internal
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidRequest(msg) => Self::Validation(msg),
            GatewayError::ProcessorRejected(msg) => Self::PaymentRejected(msg),
            GatewayError::Transient(msg) | GatewayError::Unknown(msg) => {
                tracing::error!(error = %msg, "gateway failure");
                Self::PaymentUnavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("booking".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::PaymentRejected("declined".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_booking_error_mapping() {
        let err: ApiError = BookingError::Forbidden.into();
        assert_eq!(err.kind(), "forbidden");

        let err: ApiError =
            BookingError::Gateway(GatewayError::ProcessorRejected("declined".into())).into();
        assert_eq!(err.kind(), "payment_rejected");

        let err: ApiError =
            BookingError::Gateway(GatewayError::Transient("502".into())).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
