//! Wayfare payment gateway adapter
//!
//! Single seam to the external payment processor's payment-intent API.
//! Everything above this crate works in major currency units; minor-unit
//! conversion (x100 for the supported two-decimal currencies) happens only
//! at this boundary.

pub mod error;
pub mod stripe;

pub use error::{GatewayError, GatewayResult};
pub use stripe::{StripeConfig, StripeGateway};

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a processor-side payment intent, collapsed to a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Payer-side action outstanding (includes selecting a payment method)
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
    Failed,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
        }
    }

    /// Map a raw processor status string into the closed set
    pub fn from_processor(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "canceled" => Self::Canceled,
            s if s.starts_with("requires_") => Self::RequiresAction,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A processor-side payment authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Opaque processor id
    pub id: String,
    /// Client-facing secret the payer's client uses to complete
    /// authorization out-of-band; present on freshly created intents
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    /// Amount in the processor's minor unit
    pub amount_minor: i64,
    pub currency: String,
}

/// Result of a refund request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub id: String,
    /// Refunded amount in major units
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub reason: Option<String>,
}

/// Traceability metadata attached to every created intent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub booking_id: Uuid,
    pub booking_kind: String,
    pub target_id: Uuid,
    pub owner_id: Uuid,
    pub confirmation_code: String,
}

/// The payment processor seam
///
/// Implementations must return tagged [`GatewayError`] results for expected
/// processor rejections rather than treating them as exceptional.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Processor public key reference handed to the payer's client
    fn public_key(&self) -> String;

    /// Open a payment authorization for `amount` major units of `currency`
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> GatewayResult<PaymentIntent>;

    /// Current state of a previously created intent
    async fn retrieve_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent>;

    /// Server-side confirmation path (no client interaction needed)
    async fn confirm_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent>;

    async fn cancel_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent>;

    /// Full refund when `amount` is omitted, partial otherwise
    async fn refund(
        &self,
        intent_id: &str,
        amount: Option<Decimal>,
        reason: Option<&str>,
    ) -> GatewayResult<RefundOutcome>;
}

/// Convert a major-unit amount to the processor's minor unit
pub fn to_minor_units(amount: Decimal) -> GatewayResult<i64> {
    if amount < Decimal::ZERO {
        return Err(GatewayError::InvalidRequest(format!(
            "amount must be non-negative, got {amount}"
        )));
    }
    let minor = amount * Decimal::from(100);
    if minor.fract() != Decimal::ZERO {
        return Err(GatewayError::InvalidRequest(format!(
            "amount {amount} has sub-minor-unit precision"
        )));
    }
    minor.to_i64().ok_or_else(|| {
        GatewayError::InvalidRequest(format!("amount {amount} out of range"))
    })
}

/// Convert a minor-unit amount back to major units
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::from(minor) / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping() {
        assert_eq!(IntentStatus::from_processor("succeeded"), IntentStatus::Succeeded);
        assert_eq!(IntentStatus::from_processor("processing"), IntentStatus::Processing);
        assert_eq!(IntentStatus::from_processor("canceled"), IntentStatus::Canceled);
        assert_eq!(
            IntentStatus::from_processor("requires_action"),
            IntentStatus::RequiresAction
        );
        assert_eq!(
            IntentStatus::from_processor("requires_payment_method"),
            IntentStatus::RequiresAction
        );
        assert_eq!(IntentStatus::from_processor("exploded"), IntentStatus::Failed);
    }

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(to_minor_units(dec!(210.00)).unwrap(), 21000);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert_eq!(from_minor_units(21000), dec!(210.00));
    }

    #[test]
    fn test_minor_unit_rejects_bad_amounts() {
        assert!(matches!(
            to_minor_units(dec!(-1)),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            to_minor_units(dec!(10.005)),
            Err(GatewayError::InvalidRequest(_))
        ));
    }
}
