//! Gateway error taxonomy
//!
//! The processor's rich exception hierarchy is collapsed into four kinds so
//! callers branch on a closed set. Expected processor rejections come back
//! as values, never as panics.

use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Uniform error shape surfaced by the payment gateway adapter
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Bad parameters; not retryable
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Processor declined (e.g. card declined); user must retry with
    /// different payment details
    #[error("processor rejected: {0}")]
    ProcessorRejected(String),

    /// Network failure, timeout, or processor 5xx; safe to retry with backoff
    #[error("transient gateway failure: {0}")]
    Transient(String),

    /// Opaque failure; logged, not retried automatically
    #[error("unknown gateway failure: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Stable machine-readable kind for API responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ProcessorRejected(_) => "processor_rejected",
            Self::Transient(_) => "transient",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Whether an automatic retry is safe
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
