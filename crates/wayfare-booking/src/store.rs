//! Persistence and catalog seams
//!
//! The state machine talks to durable storage through these traits. The
//! store must serialize concurrent writers per booking row; the contract
//! here is optimistic: updates are conditional on the expected lifecycle
//! state and report whether the guard held.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use wayfare_types::{Booking, BookingKind, BookingState, Hotel, Restaurant};

/// Storage-level failures, independent of any one backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint violated (confirmation code, intent id)
    #[error("duplicate value: {0}")]
    Duplicate(String),

    /// Backend failure (connectivity, query, serialization)
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Durable storage for booking records
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Persist `booking` only if the stored row is still in `expected_state`.
    ///
    /// Returns `false` when the guard fails, meaning a concurrent writer got
    /// there first; the caller decides whether that is a conflict or an
    /// idempotent no-op.
    async fn update_in_state(
        &self,
        booking: &Booking,
        expected_state: BookingState,
    ) -> Result<bool, StoreError>;

    /// Unconditional removal; used by compensating cleanup and
    /// administrative deletion only
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Owner's bookings, newest first, with the total match count
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        kind: Option<BookingKind>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, u64), StoreError>;
}

/// Read-only catalog lookups for existence checks and price basis
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError>;

    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError>;
}
