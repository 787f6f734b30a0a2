//! Catalog handlers
//!
//! Public reads; no identity required.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use wayfare_types::{Hotel, Restaurant};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/hotels/{id}
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<Uuid>,
) -> ApiResult<Json<Hotel>> {
    let hotel = state
        .catalog
        .hotel(hotel_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "catalog lookup failed");
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("hotel".to_string()))?;
    Ok(Json(hotel))
}

/// GET /api/v1/restaurants/{id}
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> ApiResult<Json<Restaurant>> {
    let restaurant = state
        .catalog
        .restaurant(restaurant_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "catalog lookup failed");
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("restaurant".to_string()))?;
    Ok(Json(restaurant))
}
