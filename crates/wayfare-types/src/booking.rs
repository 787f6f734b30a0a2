//! Booking entity and lifecycle states
//!
//! A booking must never be `Confirmed` without a verified successful payment,
//! and exactly one of the hotel/restaurant targets is set, matching the kind.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Failed to parse a persisted state string
#[derive(Debug, Clone, Error)]
#[error("unrecognized {field} value: {value}")]
pub struct ParseStateError {
    pub field: &'static str,
    pub value: String,
}

/// What kind of resource a booking reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    Hotel,
    Restaurant,
}

impl BookingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Restaurant => "restaurant",
        }
    }
}

impl fmt::Display for BookingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingKind {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hotel" => Ok(Self::Hotel),
            "restaurant" => Ok(Self::Restaurant),
            other => Err(ParseStateError {
                field: "booking_kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Booking lifecycle state
///
/// `Pending` exists only during the create transition: a booking whose
/// payment intent was never opened does not survive the create operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Created, no payment attempt yet
    Pending,
    /// Payment intent open, client must complete authorization
    AwaitingPayment,
    /// Payment verified successful; booking fully honored
    Confirmed,
    /// Payment attempt failed terminally
    PaymentFailed,
    /// Cancelled before or after payment
    Cancelled,
}

impl BookingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirmed => "confirmed",
            Self::PaymentFailed => "payment_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "confirmed" => Ok(Self::Confirmed),
            "payment_failed" => Ok(Self::PaymentFailed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseStateError {
                field: "booking_state",
                value: other.to_string(),
            }),
        }
    }
}

/// Payment state, tracked separately from the booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Processing,
    Paid,
    Failed,
    Refunded,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(ParseStateError {
                field: "payment_state",
                value: other.to_string(),
            }),
        }
    }
}

/// Refund progress after a post-payment cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundState {
    Pending,
    Processed,
    Failed,
}

impl RefundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for RefundState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            other => Err(ParseStateError {
                field: "refund_state",
                value: other.to_string(),
            }),
        }
    }
}

/// Pricing breakdown, all amounts in major units of `currency`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub base_amount: Decimal,
    pub tax_amount: Decimal,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
    /// ISO 4217 code, e.g. "USD"
    pub currency: String,
}

/// A hotel or restaurant reservation with its payment bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Owning principal; only the owner may confirm or cancel
    pub owner_id: Uuid,
    pub kind: BookingKind,
    /// Set iff `kind == Hotel`
    pub hotel_id: Option<Uuid>,
    /// Set iff `kind == Restaurant`
    pub restaurant_id: Option<Uuid>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub reservation_date: Option<NaiveDate>,
    /// "HH:MM", restaurant bookings only
    pub reservation_time: Option<String>,
    pub guest_count: i32,
    pub room_count: Option<i32>,
    pub special_request: Option<String>,
    #[serde(flatten)]
    pub pricing: Pricing,
    pub payment_state: PaymentState,
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub customer_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub state: BookingState,
    /// Short user-facing reference, generated once at creation, immutable
    pub confirmation_code: String,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refund_state: Option<RefundState>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The hotel or restaurant this booking targets
    pub fn target_id(&self) -> Option<Uuid> {
        match self.kind {
            BookingKind::Hotel => self.hotel_id,
            BookingKind::Restaurant => self.restaurant_id,
        }
    }

    /// Invariant check: exactly one target set, matching the kind
    pub fn target_matches_kind(&self) -> bool {
        match self.kind {
            BookingKind::Hotel => self.hotel_id.is_some() && self.restaurant_id.is_none(),
            BookingKind::Restaurant => self.restaurant_id.is_some() && self.hotel_id.is_none(),
        }
    }

    /// A confirmed booking must have a verified payment behind it
    pub fn payment_consistent(&self) -> bool {
        self.state != BookingState::Confirmed
            || (self.payment_state == PaymentState::Paid && self.payment_date.is_some())
    }
}

/// Generate a unique human-shareable confirmation code ("WF" + 8 hex chars)
pub fn generate_confirmation_code() -> String {
    let bytes: [u8; 4] = rand::thread_rng().gen();
    format!(
        "WF{:02X}{:02X}{:02X}{:02X}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}
