//! Catalog entities: hotels and restaurants
//!
//! Read-only from the booking core's perspective. The nightly/per-table
//! price is the price basis the pricing engine works from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rating: Decimal,
    /// Nightly rate per room, major units
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub rating: Decimal,
    /// Indicative price level, major units
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
