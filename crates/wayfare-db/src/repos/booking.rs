//! Booking repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbBooking, DbError, DbResult};

pub struct BookingRepo {
    pool: PgPool,
}

impl BookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, booking: &DbBooking) -> DbResult<DbBooking> {
        let row = sqlx::query_as::<_, DbBooking>(
            r#"
            INSERT INTO wf_bookings (id, user_id, booking_kind, hotel_id, restaurant_id,
                check_in_date, check_out_date, reservation_date, reservation_time,
                guest_count, room_count, special_request,
                base_amount, tax_amount, service_fee, total_amount, currency,
                payment_status, payment_intent_id, charge_id, customer_id, payment_date,
                booking_status, confirmation_code, cancelled_at, cancellation_reason,
                refund_amount, refund_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(&booking.booking_kind)
        .bind(booking.hotel_id)
        .bind(booking.restaurant_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.reservation_date)
        .bind(&booking.reservation_time)
        .bind(booking.guest_count)
        .bind(booking.room_count)
        .bind(&booking.special_request)
        .bind(booking.base_amount)
        .bind(booking.tax_amount)
        .bind(booking.service_fee)
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(&booking.payment_status)
        .bind(&booking.payment_intent_id)
        .bind(&booking.charge_id)
        .bind(&booking.customer_id)
        .bind(booking.payment_date)
        .bind(&booking.booking_status)
        .bind(&booking.confirmation_code)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.refund_amount)
        .bind(&booking.refund_status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_query)?;
        Ok(row)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbBooking>> {
        let row = sqlx::query_as::<_, DbBooking>("SELECT * FROM wf_bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_intent_id(&self, intent_id: &str) -> DbResult<Option<DbBooking>> {
        let row = sqlx::query_as::<_, DbBooking>(
            "SELECT * FROM wf_bookings WHERE payment_intent_id = $1",
        )
        .bind(intent_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Write the full row back, but only while the stored lifecycle state
    /// still matches `expected_status`. Returns the updated row, or `None`
    /// when a concurrent writer moved the booking first.
    pub async fn update_in_status(
        &self,
        booking: &DbBooking,
        expected_status: &str,
    ) -> DbResult<Option<DbBooking>> {
        let row = sqlx::query_as::<_, DbBooking>(
            r#"
            UPDATE wf_bookings SET
                payment_status = $3, payment_intent_id = $4, charge_id = $5,
                customer_id = $6, payment_date = $7, booking_status = $8,
                cancelled_at = $9, cancellation_reason = $10,
                refund_amount = $11, refund_status = $12, updated_at = $13
            WHERE id = $1 AND booking_status = $2
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(expected_status)
        .bind(&booking.payment_status)
        .bind(&booking.payment_intent_id)
        .bind(&booking.charge_id)
        .bind(&booking.customer_id)
        .bind(booking.payment_date)
        .bind(&booking.booking_status)
        .bind(booking.cancelled_at)
        .bind(&booking.cancellation_reason)
        .bind(booking.refund_amount)
        .bind(&booking.refund_status)
        .bind(booking.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from_query)?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        sqlx::query("DELETE FROM wf_bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        kind: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbBooking>> {
        let rows = if let Some(k) = kind {
            sqlx::query_as::<_, DbBooking>(
                "SELECT * FROM wf_bookings WHERE user_id = $1 AND booking_kind = $2 ORDER BY created_at DESC LIMIT $3 OFFSET $4"
            )
            .bind(user_id)
            .bind(k)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, DbBooking>(
                "SELECT * FROM wf_bookings WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    pub async fn count_by_user(&self, user_id: Uuid, kind: Option<&str>) -> DbResult<i64> {
        let count: (i64,) = if let Some(k) = kind {
            sqlx::query_as(
                "SELECT COUNT(*) FROM wf_bookings WHERE user_id = $1 AND booking_kind = $2",
            )
            .bind(user_id)
            .bind(k)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_as("SELECT COUNT(*) FROM wf_bookings WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(count.0)
    }
}
