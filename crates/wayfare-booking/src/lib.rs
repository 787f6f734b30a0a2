//! Wayfare booking state machine
//!
//! Owns booking lifecycle transitions and coordinates between persisted
//! booking records and the payment gateway adapter. The interesting part is
//! the partial-failure window in Create: the booking row is persisted before
//! the processor call, and a failed intent creation triggers a compensating
//! delete so no orphaned booking survives.
//!
//! # State machine
//!
//! ```text
//! (create)        pending ──────────► awaiting_payment
//!                    │ gateway error       │
//!                    ▼                     │ processor "succeeded"
//!                 deleted                  ▼
//!                                      confirmed        (terminal)
//! awaiting_payment | confirmed ──────► cancelled        (terminal)
//! ```
//!
//! Storage and catalog lookups sit behind the [`BookingStore`] and
//! [`Catalog`] traits; `wayfare-db` provides the PostgreSQL implementation
//! and [`memory`] provides in-memory ones for tests and local development.

pub mod error;
pub mod memory;
pub mod service;
pub mod store;

pub use error::{BookingError, BookingResult};
pub use service::{
    BookingService, ConfirmOutcome, CreatedBooking, HotelBookingRequest, Page,
    RestaurantBookingRequest,
};
pub use store::{BookingStore, Catalog, StoreError};
