//! Booking lifecycle transitions
//!
//! Each transition is a separate operation on [`BookingService`]: Create
//! (hotel or restaurant), Confirm, Cancel, plus owner-scoped reads. The
//! create flow is the one with a real partial-failure window and carries a
//! compensating delete; see the module docs on [`crate`].

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use wayfare_gateway::{IntentMetadata, IntentStatus, PaymentGateway, PaymentIntent};
use wayfare_pricing::PricingConfig;
use wayfare_types::{
    generate_confirmation_code, Booking, BookingKind, BookingState, PaymentState, RefundState,
};

use crate::error::{BookingError, BookingResult};
use crate::store::{BookingStore, Catalog};

/// Hard cap on list page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Create-hotel-booking input
#[derive(Debug, Clone, Deserialize)]
pub struct HotelBookingRequest {
    pub hotel_id: Uuid,
    pub check_in_date: chrono::NaiveDate,
    pub check_out_date: chrono::NaiveDate,
    pub room_count: i32,
    pub guest_count: i32,
    pub special_request: Option<String>,
}

/// Create-restaurant-booking input
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantBookingRequest {
    pub restaurant_id: Uuid,
    pub reservation_date: chrono::NaiveDate,
    /// "HH:MM"
    pub reservation_time: String,
    pub guest_count: i32,
    pub special_request: Option<String>,
}

/// Successful create result: the persisted booking plus what the payer's
/// client needs to complete authorization
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub client_secret: String,
    pub public_key: String,
}

/// Outcome of a Confirm transition
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// Payment verified; booking is (or already was) confirmed
    Confirmed(Booking),
    /// Processor has not reported success; booking stays in
    /// `awaiting_payment` and the caller sees the processor status
    Incomplete {
        booking: Booking,
        processor_status: IntentStatus,
    },
}

/// One page of results with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: u64,
    pub pages: u64,
}

/// The booking state machine
///
/// Holds its collaborators behind trait objects and its pricing rates as an
/// explicit config value; process-wide setup stays in the server binary.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    catalog: Arc<dyn Catalog>,
    gateway: Arc<dyn PaymentGateway>,
    pricing: PricingConfig,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: Arc<dyn Catalog>,
        gateway: Arc<dyn PaymentGateway>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            gateway,
            pricing,
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    pub async fn create_hotel_booking(
        &self,
        owner_id: Uuid,
        request: HotelBookingRequest,
    ) -> BookingResult<CreatedBooking> {
        if request.room_count < 1 {
            return Err(BookingError::Validation(
                "room_count must be positive".to_string(),
            ));
        }
        if request.guest_count < 1 {
            return Err(BookingError::Validation(
                "guest_count must be positive".to_string(),
            ));
        }
        let today = Utc::now().date_naive();
        if request.check_in_date <= today {
            return Err(BookingError::Validation(
                "check-in date must be in the future".to_string(),
            ));
        }
        if request.check_out_date <= request.check_in_date {
            return Err(BookingError::Validation(
                "check-out date must be after check-in date".to_string(),
            ));
        }

        let hotel = self
            .catalog
            .hotel(request.hotel_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("hotel".to_string()))?;

        let nights = (request.check_out_date - request.check_in_date).num_days();
        let base = self
            .pricing
            .hotel_base(hotel.price, nights, i64::from(request.room_count));
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            owner_id,
            kind: BookingKind::Hotel,
            hotel_id: Some(hotel.id),
            restaurant_id: None,
            check_in_date: Some(request.check_in_date),
            check_out_date: Some(request.check_out_date),
            reservation_date: None,
            reservation_time: None,
            guest_count: request.guest_count,
            room_count: Some(request.room_count),
            special_request: request.special_request,
            pricing: self.pricing.quote(base),
            payment_state: PaymentState::Pending,
            payment_intent_id: None,
            charge_id: None,
            customer_id: None,
            payment_date: None,
            state: BookingState::Pending,
            confirmation_code: generate_confirmation_code(),
            cancelled_at: None,
            cancellation_reason: None,
            refund_amount: None,
            refund_state: None,
            created_at: now,
            updated_at: now,
        };

        self.open_payment(booking).await
    }

    pub async fn create_restaurant_booking(
        &self,
        owner_id: Uuid,
        request: RestaurantBookingRequest,
    ) -> BookingResult<CreatedBooking> {
        if request.guest_count < 1 {
            return Err(BookingError::Validation(
                "guest_count must be positive".to_string(),
            ));
        }
        let today = Utc::now().date_naive();
        if request.reservation_date <= today {
            return Err(BookingError::Validation(
                "reservation date must be in the future".to_string(),
            ));
        }
        if NaiveTime::parse_from_str(&request.reservation_time, "%H:%M").is_err() {
            return Err(BookingError::Validation(
                "reservation_time must be HH:MM".to_string(),
            ));
        }

        let restaurant = self
            .catalog
            .restaurant(request.restaurant_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("restaurant".to_string()))?;

        let base = self.pricing.restaurant_base(i64::from(request.guest_count));
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            owner_id,
            kind: BookingKind::Restaurant,
            hotel_id: None,
            restaurant_id: Some(restaurant.id),
            check_in_date: None,
            check_out_date: None,
            reservation_date: Some(request.reservation_date),
            reservation_time: Some(request.reservation_time),
            guest_count: request.guest_count,
            room_count: None,
            special_request: request.special_request,
            pricing: self.pricing.quote(base),
            payment_state: PaymentState::Pending,
            payment_intent_id: None,
            charge_id: None,
            customer_id: None,
            payment_date: None,
            state: BookingState::Pending,
            confirmation_code: generate_confirmation_code(),
            cancelled_at: None,
            cancellation_reason: None,
            refund_amount: None,
            refund_state: None,
            created_at: now,
            updated_at: now,
        };

        self.open_payment(booking).await
    }

    /// Shared tail of the create flow: persist pending, open the payment
    /// intent, and either advance to `awaiting_payment` or compensate.
    ///
    /// The gateway call is treated as a critical section: once the pending
    /// row exists the full sequence runs to completion; an abandoning caller
    /// should cancel afterwards, not mid-flight.
    async fn open_payment(&self, mut booking: Booking) -> BookingResult<CreatedBooking> {
        debug_assert!(booking.target_matches_kind());
        self.insert_with_code_retry(&mut booking).await?;

        let target_id = booking
            .target_id()
            .ok_or_else(|| BookingError::Internal("booking has no target".to_string()))?;
        let metadata = IntentMetadata {
            booking_id: booking.id,
            booking_kind: booking.kind.as_str().to_string(),
            target_id,
            owner_id: booking.owner_id,
            confirmation_code: booking.confirmation_code.clone(),
        };

        let intent = match self.create_intent_with_retry(&booking, &metadata).await {
            Ok(intent) => intent,
            Err(gateway_err) => {
                // Compensating action: the pending row must not survive a
                // failed intent creation. A cleanup failure is logged but
                // never masks the gateway error in the response.
                if let Err(cleanup) = self.store.delete(booking.id).await {
                    error!(
                        booking_id = %booking.id,
                        error = %cleanup,
                        "compensating delete failed after gateway error"
                    );
                }
                return Err(BookingError::Gateway(gateway_err));
            }
        };

        booking.payment_intent_id = Some(intent.id.clone());
        booking.payment_state = PaymentState::Processing;
        booking.state = BookingState::AwaitingPayment;
        booking.updated_at = Utc::now();

        let updated = self
            .store
            .update_in_state(&booking, BookingState::Pending)
            .await?;
        if !updated {
            return Err(BookingError::Conflict(
                "booking changed during creation".to_string(),
            ));
        }

        info!(
            booking_id = %booking.id,
            kind = booking.kind.as_str(),
            confirmation_code = %booking.confirmation_code,
            total = %booking.pricing.total_amount,
            "booking created, awaiting payment"
        );

        Ok(CreatedBooking {
            booking,
            client_secret: intent.client_secret.unwrap_or_default(),
            public_key: self.gateway.public_key(),
        })
    }

    /// Insert, retrying once with a regenerated confirmation code on a
    /// duplicate-key collision (extremely rare)
    async fn insert_with_code_retry(&self, booking: &mut Booking) -> BookingResult<()> {
        use crate::store::StoreError;

        match self.store.insert(booking).await {
            Ok(()) => Ok(()),
            Err(StoreError::Duplicate(msg)) => {
                warn!(booking_id = %booking.id, %msg, "duplicate on insert, regenerating confirmation code");
                booking.confirmation_code = generate_confirmation_code();
                self.store.insert(booking).await.map_err(BookingError::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// One automatic retry for transient gateway failures; everything else
    /// surfaces immediately
    async fn create_intent_with_retry(
        &self,
        booking: &Booking,
        metadata: &IntentMetadata,
    ) -> Result<PaymentIntent, wayfare_gateway::GatewayError> {
        let amount = booking.pricing.total_amount;
        let currency = &booking.pricing.currency;
        match self.gateway.create_intent(amount, currency, metadata).await {
            Ok(intent) => Ok(intent),
            Err(e) if e.is_retryable() => {
                warn!(booking_id = %booking.id, error = %e, "transient gateway failure, retrying once");
                self.gateway.create_intent(amount, currency, metadata).await
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Confirm
    // ========================================================================

    /// Verify payment with the processor and finalize the booking.
    ///
    /// Idempotent: once confirmed, re-invocation returns the current state
    /// without touching the gateway. A non-succeeded processor status leaves
    /// the booking in `awaiting_payment`; the caller retries or cancels.
    pub async fn confirm_payment(
        &self,
        caller_id: Uuid,
        booking_id: Uuid,
    ) -> BookingResult<ConfirmOutcome> {
        let booking = self.load_owned(caller_id, booking_id).await?;

        if booking.state == BookingState::Confirmed {
            return Ok(ConfirmOutcome::Confirmed(booking));
        }
        if booking.state == BookingState::Cancelled {
            return Err(BookingError::Conflict(
                "booking is cancelled".to_string(),
            ));
        }
        let intent_id = booking
            .payment_intent_id
            .clone()
            .ok_or_else(|| BookingError::Conflict("booking has no payment intent".to_string()))?;

        let intent = self.gateway.retrieve_intent(&intent_id).await?;
        if intent.status != IntentStatus::Succeeded {
            info!(
                booking_id = %booking.id,
                processor_status = intent.status.as_str(),
                "payment not completed"
            );
            return Ok(ConfirmOutcome::Incomplete {
                booking,
                processor_status: intent.status,
            });
        }

        let now = Utc::now();
        let mut confirmed = booking.clone();
        confirmed.payment_state = PaymentState::Paid;
        confirmed.state = BookingState::Confirmed;
        confirmed.payment_date = Some(now);
        confirmed.updated_at = now;

        if self.store.update_in_state(&confirmed, booking.state).await? {
            info!(booking_id = %confirmed.id, "payment confirmed");
            return Ok(ConfirmOutcome::Confirmed(confirmed));
        }

        // Lost the race against another writer; re-read to see who won.
        match self.store.find(booking_id).await? {
            Some(current) if current.state == BookingState::Confirmed => {
                Ok(ConfirmOutcome::Confirmed(current))
            }
            _ => Err(BookingError::Conflict(
                "booking changed concurrently".to_string(),
            )),
        }
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Cancel a booking, refunding through the gateway when payment had
    /// completed. Never-paid cancellations are local-only.
    pub async fn cancel(
        &self,
        caller_id: Uuid,
        booking_id: Uuid,
        reason: Option<String>,
    ) -> BookingResult<Booking> {
        let booking = self.load_owned(caller_id, booking_id).await?;

        if booking.state == BookingState::Cancelled {
            return Err(BookingError::Conflict(
                "booking is already cancelled".to_string(),
            ));
        }

        let now = Utc::now();
        let mut cancelled = booking.clone();

        if booking.payment_state == PaymentState::Paid {
            let intent_id = booking.payment_intent_id.clone().ok_or_else(|| {
                BookingError::Internal("paid booking has no payment intent".to_string())
            })?;
            let refund = self
                .gateway
                .refund(&intent_id, None, Some("requested_by_customer"))
                .await?;
            info!(
                booking_id = %booking.id,
                refund_id = %refund.id,
                amount = %refund.amount,
                status = %refund.status,
                "refund issued"
            );
            cancelled.refund_amount = Some(refund.amount);
            cancelled.refund_state = Some(match refund.status.as_str() {
                "succeeded" => RefundState::Processed,
                "failed" => RefundState::Failed,
                _ => RefundState::Pending,
            });
            cancelled.payment_state = PaymentState::Refunded;
        }

        cancelled.state = BookingState::Cancelled;
        cancelled.cancelled_at = Some(now);
        cancelled.cancellation_reason = reason;
        cancelled.updated_at = now;

        if self.store.update_in_state(&cancelled, booking.state).await? {
            info!(booking_id = %cancelled.id, "booking cancelled");
            Ok(cancelled)
        } else {
            Err(BookingError::Conflict(
                "booking changed concurrently".to_string(),
            ))
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get_booking(&self, caller_id: Uuid, booking_id: Uuid) -> BookingResult<Booking> {
        self.load_owned(caller_id, booking_id).await
    }

    pub async fn list_own_bookings(
        &self,
        owner_id: Uuid,
        kind: Option<BookingKind>,
        page: i64,
        page_size: i64,
    ) -> BookingResult<Page<Booking>> {
        // Page ceiling keeps the offset multiplication within i64.
        let page = page.clamp(1, i64::MAX / MAX_PAGE_SIZE);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * page_size;

        let (items, total) = self
            .store
            .list_by_owner(owner_id, kind, page_size, offset)
            .await?;
        let pages = (total + page_size as u64 - 1) / page_size as u64;

        Ok(Page {
            items,
            page,
            page_size,
            total,
            pages,
        })
    }

    /// Fetch and enforce ownership before any transition
    async fn load_owned(&self, caller_id: Uuid, booking_id: Uuid) -> BookingResult<Booking> {
        let booking = self
            .store
            .find(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("booking".to_string()))?;
        if booking.owner_id != caller_id {
            return Err(BookingError::Forbidden);
        }
        Ok(booking)
    }
}
