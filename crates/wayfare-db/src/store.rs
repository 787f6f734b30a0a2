//! Trait adapters wiring the repositories into the booking core
//!
//! `PgBookingStore` implements the storage and catalog seams over the
//! repository layer, translating database failures into the storage error
//! vocabulary the state machine understands.

use async_trait::async_trait;
use uuid::Uuid;

use wayfare_booking::{BookingStore, Catalog, StoreError};
use wayfare_types::{Booking, BookingKind, BookingState, Hotel, Restaurant};

use crate::error::DbError;
use crate::models::DbBooking;
use crate::repos::{BookingRepo, CatalogRepo};

/// PostgreSQL-backed booking store and catalog
pub struct PgBookingStore {
    bookings: BookingRepo,
    catalog: CatalogRepo,
}

impl PgBookingStore {
    pub fn new(bookings: BookingRepo, catalog: CatalogRepo) -> Self {
        Self { bookings, catalog }
    }
}

fn map_db_error(e: DbError) -> StoreError {
    match e {
        DbError::Duplicate(constraint) => StoreError::Duplicate(constraint),
        other => StoreError::Storage(other.to_string()),
    }
}

fn into_domain(row: DbBooking) -> Result<Booking, StoreError> {
    Booking::try_from(row).map_err(|e| StoreError::Storage(e.to_string()))
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        let row = DbBooking::from(booking);
        self.bookings.create(&row).await.map_err(map_db_error)?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = self.bookings.find_by_id(id).await.map_err(map_db_error)?;
        row.map(into_domain).transpose()
    }

    async fn update_in_state(
        &self,
        booking: &Booking,
        expected_state: BookingState,
    ) -> Result<bool, StoreError> {
        let row = DbBooking::from(booking);
        let updated = self
            .bookings
            .update_in_status(&row, expected_state.as_str())
            .await
            .map_err(map_db_error)?;
        Ok(updated.is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.bookings.delete(id).await.map_err(map_db_error)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        kind: Option<BookingKind>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, u64), StoreError> {
        let kind_str = kind.map(|k| k.as_str());
        let total = self
            .bookings
            .count_by_user(owner_id, kind_str)
            .await
            .map_err(map_db_error)?;
        let rows = self
            .bookings
            .find_by_user(owner_id, kind_str, limit, offset)
            .await
            .map_err(map_db_error)?;
        let items = rows
            .into_iter()
            .map(into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total.max(0) as u64))
    }
}

#[async_trait]
impl Catalog for PgBookingStore {
    async fn hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        let row = self.catalog.find_hotel(id).await.map_err(map_db_error)?;
        Ok(row.map(Hotel::from))
    }

    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        let row = self
            .catalog
            .find_restaurant(id)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Restaurant::from))
    }
}
