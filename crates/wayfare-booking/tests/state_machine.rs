//! Booking state machine tests against the in-memory seams

use std::sync::Arc;

use chrono::{Days, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use wayfare_booking::memory::{InMemoryCatalog, InMemoryStore, MockGateway};
use wayfare_booking::{
    BookingError, BookingService, BookingStore, ConfirmOutcome, HotelBookingRequest,
    RestaurantBookingRequest, StoreError,
};
use wayfare_gateway::{GatewayError, IntentStatus};
use wayfare_pricing::PricingConfig;
use wayfare_types::{BookingKind, BookingState, Hotel, PaymentState, RefundState, Restaurant};

struct Fixture {
    service: BookingService,
    store: Arc<InMemoryStore>,
    gateway: Arc<MockGateway>,
    hotel_id: Uuid,
    restaurant_id: Uuid,
    owner: Uuid,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let gateway = Arc::new(MockGateway::new());
    let now = Utc::now();

    let hotel_id = Uuid::new_v4();
    catalog.insert_hotel(Hotel {
        id: hotel_id,
        name: "Harbor View".to_string(),
        description: "Waterfront rooms".to_string(),
        location: "Lisbon".to_string(),
        rating: dec!(4.5),
        price: dec!(100),
        created_at: now,
        updated_at: now,
    });

    let restaurant_id = Uuid::new_v4();
    catalog.insert_restaurant(Restaurant {
        id: restaurant_id,
        name: "Casa Azul".to_string(),
        description: "Seafood".to_string(),
        location: "Lisbon".to_string(),
        rating: dec!(4.2),
        price: dec!(30),
        created_at: now,
        updated_at: now,
    });

    let service = BookingService::new(
        store.clone(),
        catalog,
        gateway.clone(),
        PricingConfig::default(),
    );

    Fixture {
        service,
        store,
        gateway,
        hotel_id,
        restaurant_id,
        owner: Uuid::new_v4(),
    }
}

fn hotel_request(fx: &Fixture) -> HotelBookingRequest {
    let check_in = Utc::now().date_naive() + Days::new(30);
    HotelBookingRequest {
        hotel_id: fx.hotel_id,
        check_in_date: check_in,
        check_out_date: check_in + Days::new(2),
        room_count: 1,
        guest_count: 2,
        special_request: None,
    }
}

fn restaurant_request(fx: &Fixture) -> RestaurantBookingRequest {
    RestaurantBookingRequest {
        restaurant_id: fx.restaurant_id,
        reservation_date: Utc::now().date_naive() + Days::new(14),
        reservation_time: "19:00".to_string(),
        guest_count: 4,
        special_request: Some("window table".to_string()),
    }
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn hotel_booking_is_priced_and_awaits_payment() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    // 100/night, 2 nights, 1 room
    let booking = &created.booking;
    assert_eq!(booking.pricing.base_amount, dec!(200));
    assert_eq!(booking.pricing.tax_amount, dec!(0));
    assert_eq!(booking.pricing.service_fee, dec!(10.00));
    assert_eq!(booking.pricing.total_amount, dec!(210.00));
    assert_eq!(booking.pricing.currency, "USD");

    assert_eq!(booking.state, BookingState::AwaitingPayment);
    assert_eq!(booking.payment_state, PaymentState::Processing);
    assert!(booking.payment_intent_id.is_some());
    assert!(booking.confirmation_code.starts_with("WF"));
    assert!(!created.client_secret.is_empty());
    assert_eq!(created.public_key, "pk_test_mock");

    // The same record is durable
    let stored = fx.store.find(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.state, BookingState::AwaitingPayment);
    assert!(stored.target_matches_kind());
}

#[tokio::test]
async fn restaurant_booking_uses_per_guest_rate() {
    let fx = fixture();
    let created = fx
        .service
        .create_restaurant_booking(fx.owner, restaurant_request(&fx))
        .await
        .unwrap();

    // 4 guests at the fixed 10/guest rate
    let booking = &created.booking;
    assert_eq!(booking.kind, BookingKind::Restaurant);
    assert_eq!(booking.pricing.base_amount, dec!(40));
    assert_eq!(booking.pricing.total_amount, dec!(42.00));
    assert_eq!(booking.reservation_time.as_deref(), Some("19:00"));
    assert_eq!(booking.special_request.as_deref(), Some("window table"));
}

#[tokio::test]
async fn rejected_intent_leaves_no_booking_row() {
    let fx = fixture();
    fx.gateway
        .fail_next_create(GatewayError::ProcessorRejected("card declined".to_string()));

    let err = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "gateway_error");
    assert!(matches!(
        err,
        BookingError::Gateway(GatewayError::ProcessorRejected(_))
    ));
    assert_eq!(fx.store.count(), 0, "compensating delete must remove the row");
}

#[tokio::test]
async fn transient_failure_is_retried_once() {
    let fx = fixture();
    fx.gateway
        .fail_next_create(GatewayError::Transient("processor 502".to_string()));

    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    assert_eq!(created.booking.state, BookingState::AwaitingPayment);
    assert_eq!(
        fx.gateway
            .create_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        2
    );
}

#[tokio::test]
async fn repeated_transient_failure_surfaces_and_cleans_up() {
    let fx = fixture();
    fx.gateway
        .fail_next_create(GatewayError::Transient("processor 502".to_string()));
    fx.gateway
        .fail_next_create(GatewayError::Transient("processor 502".to_string()));

    let err = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "gateway_error");
    assert_eq!(
        fx.gateway
            .create_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        2,
        "exactly one automatic retry"
    );
    assert_eq!(fx.store.count(), 0);
}

#[tokio::test]
async fn code_collision_regenerates_and_retries_once() {
    let fx = fixture();
    fx.store
        .fail_next_insert(StoreError::Duplicate("confirmation code".to_string()));

    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    let attempts = fx.store.attempted_codes();
    assert_eq!(attempts.len(), 2);
    assert_ne!(attempts[0], attempts[1], "retry must carry a fresh code");
    assert_eq!(created.booking.confirmation_code, attempts[1]);
    assert!(created.booking.confirmation_code.starts_with("WF"));
    assert_eq!(created.booking.state, BookingState::AwaitingPayment);
    assert_eq!(fx.store.count(), 1);
}

#[tokio::test]
async fn repeated_code_collision_surfaces_conflict() {
    let fx = fixture();
    fx.store
        .fail_next_insert(StoreError::Duplicate("confirmation code".to_string()));
    fx.store
        .fail_next_insert(StoreError::Duplicate("confirmation code".to_string()));

    let err = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "conflict");
    assert_eq!(fx.store.count(), 0);
    assert_eq!(
        fx.gateway
            .create_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0,
        "no intent opened for a booking that never persisted"
    );
}

#[tokio::test]
async fn create_validation_rejects_bad_input() {
    let fx = fixture();
    let today = Utc::now().date_naive();

    let mut past = hotel_request(&fx);
    past.check_in_date = today - Days::new(1);
    past.check_out_date = today + Days::new(1);
    let err = fx
        .service
        .create_hotel_booking(fx.owner, past)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let mut inverted = hotel_request(&fx);
    inverted.check_out_date = inverted.check_in_date - Days::new(1);
    let err = fx
        .service
        .create_hotel_booking(fx.owner, inverted)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let mut zero_rooms = hotel_request(&fx);
    zero_rooms.room_count = 0;
    let err = fx
        .service
        .create_hotel_booking(fx.owner, zero_rooms)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    let mut bad_time = restaurant_request(&fx);
    bad_time.reservation_time = "7pm".to_string();
    let err = fx
        .service
        .create_restaurant_booking(fx.owner, bad_time)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation_error");

    // Validation failures never reach the gateway or the store
    assert_eq!(
        fx.gateway
            .create_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
    assert_eq!(fx.store.count(), 0);
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let fx = fixture();
    let mut request = hotel_request(&fx);
    request.hotel_id = Uuid::new_v4();
    let err = fx
        .service
        .create_hotel_booking(fx.owner, request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ============================================================================
// Confirm
// ============================================================================

#[tokio::test]
async fn confirm_with_incomplete_payment_keeps_awaiting() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.gateway.set_intent_status(IntentStatus::RequiresAction);

    let outcome = fx
        .service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap();

    match outcome {
        ConfirmOutcome::Incomplete {
            booking,
            processor_status,
        } => {
            assert_eq!(processor_status, IntentStatus::RequiresAction);
            assert_eq!(booking.state, BookingState::AwaitingPayment);
        }
        other => panic!("expected Incomplete, got {other:?}"),
    }

    // No state corruption: the stored row is untouched
    let stored = fx.store.find(created.booking.id).await.unwrap().unwrap();
    assert_eq!(stored.state, BookingState::AwaitingPayment);
    assert_eq!(stored.payment_state, PaymentState::Processing);
    assert!(stored.payment_date.is_none());
}

#[tokio::test]
async fn confirm_is_idempotent_after_success() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.gateway.set_intent_status(IntentStatus::Succeeded);

    let first = match fx
        .service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap()
    {
        ConfirmOutcome::Confirmed(b) => b,
        other => panic!("expected Confirmed, got {other:?}"),
    };
    assert_eq!(first.state, BookingState::Confirmed);
    assert_eq!(first.payment_state, PaymentState::Paid);
    assert!(first.payment_date.is_some());

    let retrieves_after_first = fx
        .gateway
        .retrieve_calls
        .load(std::sync::atomic::Ordering::SeqCst);

    let second = match fx
        .service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap()
    {
        ConfirmOutcome::Confirmed(b) => b,
        other => panic!("expected Confirmed, got {other:?}"),
    };

    // Same record, no duplicate payment-date update, no extra gateway call
    assert_eq!(second.payment_date, first.payment_date);
    assert_eq!(second.updated_at, first.updated_at);
    assert_eq!(
        fx.gateway
            .retrieve_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        retrieves_after_first
    );
}

#[tokio::test]
async fn confirm_by_non_owner_is_forbidden() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    let err = fx
        .service
        .confirm_payment(Uuid::new_v4(), created.booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Forbidden));
}

#[tokio::test]
async fn confirm_missing_booking_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .confirm_payment(fx.owner, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

// ============================================================================
// Cancel
// ============================================================================

#[tokio::test]
async fn cancel_unpaid_booking_is_local_only() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    let cancelled = fx
        .service
        .cancel(fx.owner, created.booking.id, Some("change of plans".to_string()))
        .await
        .unwrap();

    assert_eq!(cancelled.state, BookingState::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("change of plans"));
    assert!(cancelled.refund_amount.is_none());
    assert_eq!(
        fx.gateway
            .refund_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        0,
        "never-paid cancellation makes no gateway call"
    );
}

#[tokio::test]
async fn cancel_paid_booking_refunds_in_full() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.gateway.set_intent_status(IntentStatus::Succeeded);
    fx.service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap();

    let cancelled = fx
        .service
        .cancel(fx.owner, created.booking.id, None)
        .await
        .unwrap();

    assert_eq!(cancelled.state, BookingState::Cancelled);
    assert_eq!(cancelled.payment_state, PaymentState::Refunded);
    assert_eq!(cancelled.refund_state, Some(RefundState::Processed));
    let refund = cancelled.refund_amount.unwrap();
    assert_eq!(refund, dec!(210.00));
    assert!(refund <= cancelled.pricing.total_amount);
    assert_eq!(
        fx.gateway
            .refund_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn failed_refund_leaves_booking_untouched() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.gateway.set_intent_status(IntentStatus::Succeeded);
    fx.service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap();
    fx.gateway
        .fail_next_refund(GatewayError::Transient("processor 503".to_string()));

    let err = fx
        .service
        .cancel(fx.owner, created.booking.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "gateway_error");

    let stored = fx.store.find(created.booking.id).await.unwrap().unwrap();
    assert_eq!(stored.state, BookingState::Confirmed);
    assert_eq!(stored.payment_state, PaymentState::Paid);
}

#[tokio::test]
async fn cancel_by_non_owner_is_forbidden() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    let err = fx
        .service
        .cancel(Uuid::new_v4(), created.booking.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Forbidden));
}

#[tokio::test]
async fn cancel_twice_conflicts() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.service
        .cancel(fx.owner, created.booking.id, None)
        .await
        .unwrap();

    let err = fx
        .service
        .cancel(fx.owner, created.booking.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");
}

#[tokio::test]
async fn confirm_after_cancel_conflicts() {
    let fx = fixture();
    let created = fx
        .service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();
    fx.service
        .cancel(fx.owner, created.booking.id, None)
        .await
        .unwrap();

    let err = fx
        .service
        .confirm_payment(fx.owner, created.booking.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn list_own_bookings_pages_and_filters() {
    let fx = fixture();
    for _ in 0..2 {
        fx.service
            .create_hotel_booking(fx.owner, hotel_request(&fx))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    fx.service
        .create_restaurant_booking(fx.owner, restaurant_request(&fx))
        .await
        .unwrap();

    // Someone else's booking must not show up
    fx.service
        .create_hotel_booking(Uuid::new_v4(), hotel_request(&fx))
        .await
        .unwrap();

    let all = fx
        .service
        .list_own_bookings(fx.owner, None, 1, 2)
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.pages, 2);
    assert_eq!(all.items.len(), 2);
    // Newest first
    assert!(all.items[0].created_at >= all.items[1].created_at);

    let rest = fx
        .service
        .list_own_bookings(fx.owner, Some(BookingKind::Restaurant), 1, 10)
        .await
        .unwrap();
    assert_eq!(rest.total, 1);
    assert_eq!(rest.items[0].kind, BookingKind::Restaurant);
}

#[tokio::test]
async fn list_page_size_is_capped() {
    let fx = fixture();
    let page = fx
        .service
        .list_own_bookings(fx.owner, None, 0, 1000)
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 100);
    assert_eq!(page.total, 0);
    assert_eq!(page.pages, 0);
}

#[tokio::test]
async fn list_huge_page_number_does_not_overflow() {
    let fx = fixture();
    fx.service
        .create_hotel_booking(fx.owner, hotel_request(&fx))
        .await
        .unwrap();

    let page = fx
        .service
        .list_own_bookings(fx.owner, None, i64::MAX, 100)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 1);
}
