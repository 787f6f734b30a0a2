//! Wayfare pricing engine
//!
//! Pure price computation: given a base amount and the configured tax and
//! service-fee rates, produce the full [`Pricing`] breakdown. Deterministic
//! and side-effect free; callers re-invoke it whenever base inputs change.
//! Rates come in as an explicit [`PricingConfig`] value, never from ambient
//! globals, so the engine is testable without process-wide setup.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use wayfare_types::Pricing;

/// Minor-unit precision of the supported currencies (two-decimal)
const PRECISION: u32 = 2;

/// Pricing rates and defaults, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tax rate applied to the base amount
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// Service-fee rate applied to the base amount
    #[serde(default = "default_service_fee_rate")]
    pub service_fee_rate: Decimal,
    /// ISO 4217 currency code for all quotes
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fixed per-guest price for restaurant reservations, major units
    #[serde(default = "default_restaurant_per_guest")]
    pub restaurant_per_guest: Decimal,
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_service_fee_rate() -> Decimal {
    // 5%
    Decimal::new(5, 2)
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_restaurant_per_guest() -> Decimal {
    Decimal::new(10, 0)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: default_tax_rate(),
            service_fee_rate: default_service_fee_rate(),
            currency: default_currency(),
            restaurant_per_guest: default_restaurant_per_guest(),
        }
    }
}

impl PricingConfig {
    /// Base amount for a hotel stay: nightly rate x nights x rooms
    pub fn hotel_base(&self, nightly_rate: Decimal, nights: i64, rooms: i64) -> Decimal {
        nightly_rate * Decimal::from(nights) * Decimal::from(rooms)
    }

    /// Base amount for a restaurant reservation: per-guest rate x guests
    pub fn restaurant_base(&self, guests: i64) -> Decimal {
        self.restaurant_per_guest * Decimal::from(guests)
    }

    /// Compute the full breakdown for a non-negative base amount
    ///
    /// Each component is rounded to the currency's minor-unit precision, so
    /// `total = base + tax + fee` holds exactly on the rounded values.
    pub fn quote(&self, base_amount: Decimal) -> Pricing {
        let base_amount = round(base_amount);
        let tax_amount = round(base_amount * self.tax_rate);
        let service_fee = round(base_amount * self.service_fee_rate);
        Pricing {
            base_amount,
            tax_amount,
            service_fee,
            total_amount: base_amount + tax_amount + service_fee,
            currency: self.currency.clone(),
        }
    }
}

fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PRECISION, RoundingStrategy::MidpointAwayFromZero)
}
