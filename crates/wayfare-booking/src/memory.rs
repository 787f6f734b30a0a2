//! In-memory implementations of the store, catalog, and gateway seams
//!
//! Used by the test suites and for running the server locally without
//! PostgreSQL or processor credentials. The gateway mock is scriptable:
//! failures can be queued per call and the reported intent status set
//! directly.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use wayfare_gateway::{
    from_minor_units, to_minor_units, GatewayError, GatewayResult, IntentMetadata, IntentStatus,
    PaymentGateway, PaymentIntent, RefundOutcome,
};
use wayfare_types::{Booking, BookingKind, BookingState, Hotel, Restaurant};

use crate::store::{BookingStore, Catalog, StoreError};

// ============================================================================
// Store
// ============================================================================

/// Booking store backed by a mutex-guarded map
///
/// Like the gateway double below, insert failures can be queued to exercise
/// duplicate-key handling; attempted confirmation codes are recorded so a
/// regenerated code is observable.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<HashMap<Uuid, Booking>>,
    insert_failures: Mutex<VecDeque<StoreError>>,
    attempted_codes: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Queue an error for the next insert call; queued errors are consumed
    /// in order before any insert succeeds
    pub fn fail_next_insert(&self, error: StoreError) {
        self.insert_failures.lock().unwrap().push_back(error);
    }

    /// Confirmation codes seen by insert attempts, in call order
    pub fn attempted_codes(&self) -> Vec<String> {
        self.attempted_codes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), StoreError> {
        self.attempted_codes
            .lock()
            .unwrap()
            .push(booking.confirmation_code.clone());
        if let Some(error) = self.insert_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&booking.id) {
            return Err(StoreError::Duplicate(format!("booking id {}", booking.id)));
        }
        if rows
            .values()
            .any(|b| b.confirmation_code == booking.confirmation_code)
        {
            return Err(StoreError::Duplicate(format!(
                "confirmation code {}",
                booking.confirmation_code
            )));
        }
        rows.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update_in_state(
        &self,
        booking: &Booking,
        expected_state: BookingState,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&booking.id) {
            Some(row) if row.state == expected_state => {
                *row = booking.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        kind: Option<BookingKind>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, u64), StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<Booking> = rows
            .values()
            .filter(|b| b.owner_id == owner_id)
            .filter(|b| kind.map_or(true, |k| b.kind == k))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((items, total))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Fixed catalog of hotels and restaurants
#[derive(Default)]
pub struct InMemoryCatalog {
    hotels: Mutex<HashMap<Uuid, Hotel>>,
    restaurants: Mutex<HashMap<Uuid, Restaurant>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_hotel(&self, hotel: Hotel) {
        self.hotels.lock().unwrap().insert(hotel.id, hotel);
    }

    pub fn insert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants
            .lock()
            .unwrap()
            .insert(restaurant.id, restaurant);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn hotel(&self, id: Uuid) -> Result<Option<Hotel>, StoreError> {
        Ok(self.hotels.lock().unwrap().get(&id).cloned())
    }

    async fn restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.restaurants.lock().unwrap().get(&id).cloned())
    }
}

// ============================================================================
// Gateway
// ============================================================================

/// Scriptable payment gateway double
pub struct MockGateway {
    public_key: String,
    intents: Mutex<HashMap<String, PaymentIntent>>,
    create_failures: Mutex<VecDeque<GatewayError>>,
    refund_failure: Mutex<Option<GatewayError>>,
    reported_status: Mutex<IntentStatus>,
    pub create_calls: AtomicUsize,
    pub retrieve_calls: AtomicUsize,
    pub refund_calls: AtomicUsize,
    seq: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            public_key: "pk_test_mock".to_string(),
            intents: Mutex::new(HashMap::new()),
            create_failures: Mutex::new(VecDeque::new()),
            refund_failure: Mutex::new(None),
            reported_status: Mutex::new(IntentStatus::RequiresAction),
            create_calls: AtomicUsize::new(0),
            retrieve_calls: AtomicUsize::new(0),
            refund_calls: AtomicUsize::new(0),
            seq: AtomicUsize::new(0),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error for the next create call; queued errors are consumed
    /// in order before any call succeeds
    pub fn fail_next_create(&self, error: GatewayError) {
        self.create_failures.lock().unwrap().push_back(error);
    }

    pub fn fail_next_refund(&self, error: GatewayError) {
        *self.refund_failure.lock().unwrap() = Some(error);
    }

    /// Status reported by subsequent retrieve calls
    pub fn set_intent_status(&self, status: IntentStatus) {
        *self.reported_status.lock().unwrap() = status;
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn public_key(&self) -> String {
        self.public_key.clone()
    }

    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        _metadata: &IntentMetadata,
    ) -> GatewayResult<PaymentIntent> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.create_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        let id = format!("pi_mock_{n}");
        let intent = PaymentIntent {
            id: id.clone(),
            client_secret: Some(format!("{id}_secret")),
            status: IntentStatus::RequiresAction,
            amount_minor: to_minor_units(amount)?,
            currency: currency.to_string(),
        };
        self.intents.lock().unwrap().insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        let mut intent = self
            .intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidRequest(format!("no such intent: {intent_id}")))?;
        intent.status = *self.reported_status.lock().unwrap();
        intent.client_secret = None;
        Ok(intent)
    }

    async fn confirm_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        let mut intents = self.intents.lock().unwrap();
        let intent = intents
            .get_mut(intent_id)
            .ok_or_else(|| GatewayError::InvalidRequest(format!("no such intent: {intent_id}")))?;
        intent.status = IntentStatus::Succeeded;
        Ok(intent.clone())
    }

    async fn cancel_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        let mut intents = self.intents.lock().unwrap();
        let intent = intents
            .get_mut(intent_id)
            .ok_or_else(|| GatewayError::InvalidRequest(format!("no such intent: {intent_id}")))?;
        intent.status = IntentStatus::Canceled;
        Ok(intent.clone())
    }

    async fn refund(
        &self,
        intent_id: &str,
        amount: Option<Decimal>,
        reason: Option<&str>,
    ) -> GatewayResult<RefundOutcome> {
        self.refund_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.refund_failure.lock().unwrap().take() {
            return Err(error);
        }
        let intent = self
            .intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidRequest(format!("no such intent: {intent_id}")))?;
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        Ok(RefundOutcome {
            id: format!("re_mock_{n}"),
            amount: amount.unwrap_or_else(|| from_minor_units(intent.amount_minor)),
            currency: intent.currency,
            status: "succeeded".to_string(),
            reason: reason.map(String::from),
        })
    }
}
