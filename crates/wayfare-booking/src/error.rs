//! Booking error taxonomy

use thiserror::Error;
use wayfare_gateway::GatewayError;

use crate::store::StoreError;

/// Result type for booking operations
pub type BookingResult<T> = Result<T, BookingError>;

/// Errors surfaced by booking transitions
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed, missing, or out-of-range input; user-fixable
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced hotel, restaurant, or booking absent
    #[error("{0} not found")]
    NotFound(String),

    /// Caller is not the booking owner
    #[error("not allowed to act on this booking")]
    Forbidden,

    /// Duplicate unique field or a lost concurrent-update race
    #[error("conflict: {0}")]
    Conflict(String),

    /// Payment processor rejected or unreachable
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Unexpected failure; logged with context, generic message outward
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Gateway(_) => "gateway_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(msg) => Self::Conflict(msg),
            StoreError::Storage(msg) => Self::Internal(msg),
        }
    }
}
