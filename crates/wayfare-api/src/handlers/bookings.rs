//! Booking handlers
//!
//! Thin adapters over the booking state machine: extract the identity,
//! deserialize the payload, delegate, and map the result. All policy lives
//! in the core.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use wayfare_booking::{CreatedBooking, HotelBookingRequest, Page, RestaurantBookingRequest};
use wayfare_types::Booking;

use crate::dto::{CancelBookingRequest, ConfirmResponse, ListBookingsQuery};
use crate::error::ApiResult;
use crate::extractors::AuthenticatedUser;
use crate::state::AppState;

/// POST /api/v1/bookings/hotel
pub async fn create_hotel_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<HotelBookingRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBooking>)> {
    let created = state
        .bookings
        .create_hotel_booking(user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/bookings/restaurant
pub async fn create_restaurant_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<RestaurantBookingRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBooking>)> {
    let created = state
        .bookings
        .create_restaurant_booking(user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/bookings/{id}/confirm
pub async fn confirm_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<ConfirmResponse>> {
    let outcome = state
        .bookings
        .confirm_payment(user.user_id, booking_id)
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/bookings/{id}/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
    body: Option<Json<CancelBookingRequest>>,
) -> ApiResult<Json<Booking>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let cancelled = state
        .bookings
        .cancel(user.user_id, booking_id, reason)
        .await?;
    Ok(Json(cancelled))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = state.bookings.get_booking(user.user_id, booking_id).await?;
    Ok(Json(booking))
}

/// GET /api/v1/bookings/my
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<Page<Booking>>> {
    let page = state
        .bookings
        .list_own_bookings(user.user_id, query.kind, query.page, query.page_size)
        .await?;
    Ok(Json(page))
}
