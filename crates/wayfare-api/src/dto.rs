//! Request and response shapes specific to the HTTP surface
//!
//! Create payloads deserialize directly into the booking core's request
//! types; only the shapes that exist purely at the HTTP boundary live here.

use serde::{Deserialize, Serialize};

use wayfare_booking::ConfirmOutcome;
use wayfare_types::{Booking, BookingKind};

/// Query parameters for listing the caller's bookings
#[derive(Debug, Clone, Deserialize)]
pub struct ListBookingsQuery {
    pub kind: Option<BookingKind>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// Cancel payload; body is optional on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

/// Confirm response: either confirmed, or the processor status explaining
/// why the booking still awaits payment
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_status: Option<String>,
    pub booking: Booking,
}

impl From<ConfirmOutcome> for ConfirmResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        match outcome {
            ConfirmOutcome::Confirmed(booking) => Self {
                confirmed: true,
                processor_status: None,
                booking,
            },
            ConfirmOutcome::Incomplete {
                booking,
                processor_status,
            } => Self {
                confirmed: false,
                processor_status: Some(processor_status.as_str().to_string()),
                booking,
            },
        }
    }
}
