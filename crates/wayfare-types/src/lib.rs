//! Canonical domain types for Wayfare
//!
//! Booking records, lifecycle states, and catalog entities shared by every
//! other crate in the workspace. This crate has no dependency on any other
//! wayfare crate.

pub mod booking;
pub mod catalog;

pub use booking::{
    generate_confirmation_code, Booking, BookingKind, BookingState, ParseStateError,
    PaymentState, Pricing, RefundState,
};
pub use catalog::{Hotel, Restaurant};
