//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Bookings (identity required)
        .route("/bookings/hotel", post(handlers::bookings::create_hotel_booking))
        .route(
            "/bookings/restaurant",
            post(handlers::bookings::create_restaurant_booking),
        )
        .route("/bookings/my", get(handlers::bookings::list_my_bookings))
        .route("/bookings/:id", get(handlers::bookings::get_booking))
        .route("/bookings/:id/confirm", post(handlers::bookings::confirm_booking))
        .route("/bookings/:id/cancel", post(handlers::bookings::cancel_booking))
        // Catalog (public)
        .route("/hotels/:id", get(handlers::catalog::get_hotel))
        .route("/restaurants/:id", get(handlers::catalog::get_restaurant))
}
