//! Application state shared across handlers

use std::sync::Arc;

use async_trait::async_trait;
use wayfare_booking::{BookingService, Catalog};

/// Dependency liveness probe for the readiness endpoint
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn ready(&self) -> bool;
}

/// Probe that always reports ready; used by tests and in-memory setups
pub struct AlwaysReady;

#[async_trait]
impl ReadinessProbe for AlwaysReady {
    async fn ready(&self) -> bool {
        true
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Booking state machine
    pub bookings: Arc<BookingService>,
    /// Catalog reads for the detail endpoints
    pub catalog: Arc<dyn Catalog>,
    /// Backing-store probe
    pub readiness: Arc<dyn ReadinessProbe>,
}

impl AppState {
    pub fn new(
        bookings: Arc<BookingService>,
        catalog: Arc<dyn Catalog>,
        readiness: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self {
            bookings,
            catalog,
            readiness,
        }
    }
}
