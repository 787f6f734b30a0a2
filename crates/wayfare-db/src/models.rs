//! Database models - mapped from PostgreSQL tables
//!
//! States are stored as text columns; conversion back to the domain enums
//! can fail on a corrupt row and is therefore fallible.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use wayfare_types::{
    Booking, BookingKind, BookingState, Hotel, PaymentState, Pricing, RefundState, Restaurant,
};

use crate::error::DbError;

// ============================================================================
// Booking
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_kind: String,
    pub hotel_id: Option<Uuid>,
    pub restaurant_id: Option<Uuid>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub reservation_date: Option<NaiveDate>,
    pub reservation_time: Option<String>,
    pub guest_count: i32,
    pub room_count: Option<i32>,
    pub special_request: Option<String>,
    pub base_amount: Decimal,
    pub tax_amount: Decimal,
    pub service_fee: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_status: String,
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub customer_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub booking_status: String,
    pub confirmation_code: String,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub refund_amount: Option<Decimal>,
    pub refund_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for DbBooking {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.owner_id,
            booking_kind: b.kind.as_str().to_string(),
            hotel_id: b.hotel_id,
            restaurant_id: b.restaurant_id,
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            reservation_date: b.reservation_date,
            reservation_time: b.reservation_time.clone(),
            guest_count: b.guest_count,
            room_count: b.room_count,
            special_request: b.special_request.clone(),
            base_amount: b.pricing.base_amount,
            tax_amount: b.pricing.tax_amount,
            service_fee: b.pricing.service_fee,
            total_amount: b.pricing.total_amount,
            currency: b.pricing.currency.clone(),
            payment_status: b.payment_state.as_str().to_string(),
            payment_intent_id: b.payment_intent_id.clone(),
            charge_id: b.charge_id.clone(),
            customer_id: b.customer_id.clone(),
            payment_date: b.payment_date,
            booking_status: b.state.as_str().to_string(),
            confirmation_code: b.confirmation_code.clone(),
            cancelled_at: b.cancelled_at,
            cancellation_reason: b.cancellation_reason.clone(),
            refund_amount: b.refund_amount,
            refund_status: b.refund_state.map(|s| s.as_str().to_string()),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl TryFrom<DbBooking> for Booking {
    type Error = DbError;

    fn try_from(row: DbBooking) -> Result<Self, Self::Error> {
        let kind: BookingKind = row.booking_kind.parse()?;
        let state: BookingState = row.booking_status.parse()?;
        let payment_state: PaymentState = row.payment_status.parse()?;
        let refund_state = row
            .refund_status
            .as_deref()
            .map(|s| s.parse::<RefundState>())
            .transpose()?;

        Ok(Booking {
            id: row.id,
            owner_id: row.user_id,
            kind,
            hotel_id: row.hotel_id,
            restaurant_id: row.restaurant_id,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            reservation_date: row.reservation_date,
            reservation_time: row.reservation_time,
            guest_count: row.guest_count,
            room_count: row.room_count,
            special_request: row.special_request,
            pricing: Pricing {
                base_amount: row.base_amount,
                tax_amount: row.tax_amount,
                service_fee: row.service_fee,
                total_amount: row.total_amount,
                currency: row.currency,
            },
            payment_state,
            payment_intent_id: row.payment_intent_id,
            charge_id: row.charge_id,
            customer_id: row.customer_id,
            payment_date: row.payment_date,
            state,
            confirmation_code: row.confirmation_code,
            cancelled_at: row.cancelled_at,
            cancellation_reason: row.cancellation_reason,
            refund_amount: row.refund_amount,
            refund_state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbHotel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rating: Decimal,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbHotel> for Hotel {
    fn from(row: DbHotel) -> Self {
        Hotel {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            rating: row.rating,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbRestaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rating: Decimal,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbRestaurant> for Restaurant {
    fn from(row: DbRestaurant) -> Self {
        Restaurant {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            rating: row.rating,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
