//! Reservation repository for database operations.
//!
//! Writes that belong to the reservation lifecycle take a `&mut PgConnection`
//! so the caller can run them inside one transaction together with the
//! meeting lock and the payment rows.

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{ReservationSlot, ReservationState};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{ApplicationEntity, OccupiedSlotEntity, ReservationEntity, ReservationStateDb};
use crate::metrics::QueryTimer;

/// Values for a new reservation row.
#[derive(Debug, Clone)]
pub struct NewReservation<'a> {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub slot: ReservationSlot,
    pub amount: i64,
    pub memo: Option<&'a str>,
}

/// Repository for reservation-related database operations.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Slots held by occupying reservations on a meeting date.
    pub async fn occupied_slots(
        conn: &mut PgConnection,
        meeting_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<OccupiedSlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_occupied_slots");
        let result = sqlx::query_as::<_, OccupiedSlotEntity>(
            r#"
            SELECT reservation_date, start_time, end_time
            FROM reservations
            WHERE meeting_id = $1
              AND reservation_date = $2
              AND state IN ('pending', 'payment_success', 'accept')
            "#,
        )
        .bind(meeting_id)
        .bind(date)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Insert a pending reservation.
    pub async fn insert(
        conn: &mut PgConnection,
        reservation: &NewReservation<'_>,
    ) -> Result<ReservationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_reservation");
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            INSERT INTO reservations (meeting_id, user_id, reservation_date, start_time, end_time,
                                      amount, memo)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, meeting_id, user_id, reservation_date, start_time, end_time, amount,
                      memo, state, settlement_id, created_at, updated_at
            "#,
        )
        .bind(reservation.meeting_id)
        .bind(reservation.user_id)
        .bind(reservation.slot.date)
        .bind(reservation.slot.start_time)
        .bind(reservation.slot.end_time)
        .bind(reservation.amount)
        .bind(reservation.memo)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reservation_by_id");
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT id, meeting_id, user_id, reservation_date, start_time, end_time, amount,
                   memo, state, settlement_id, created_at, updated_at
            FROM reservations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Load a reservation and lock its row.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_reservation_by_id");
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT id, meeting_id, user_id, reservation_date, start_time, end_time, amount,
                   memo, state, settlement_id, created_at, updated_at
            FROM reservations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Move a reservation from `from` to `to`.
    ///
    /// Returns false when the reservation was no longer in `from`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: Uuid,
        from: ReservationState,
        to: ReservationState,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("transition_reservation_state");
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET state = $3, updated_at = NOW()
            WHERE id = $1 AND state = $2
            "#,
        )
        .bind(id)
        .bind(ReservationStateDb::from(from))
        .bind(ReservationStateDb::from(to))
        .execute(conn)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Paid and accepted applications on the given meetings.
    pub async fn find_applications(
        &self,
        meeting_ids: &[Uuid],
    ) -> Result<Vec<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meeting_applications");
        let result = sqlx::query_as::<_, ApplicationEntity>(
            r#"
            SELECT r.id AS reservation_id, r.meeting_id, r.user_id, u.nickname, u.image_url,
                   u.email, r.state, r.reservation_date, r.start_time, r.end_time, r.memo
            FROM reservations r
            JOIN users u ON u.id = r.user_id
            WHERE r.meeting_id = ANY($1)
              AND r.state IN ('payment_success', 'accept')
            ORDER BY r.reservation_date, r.start_time, r.created_at
            "#,
        )
        .bind(meeting_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A user's reservations, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reservations_by_user");
        let result = sqlx::query_as::<_, ReservationEntity>(
            r#"
            SELECT id, meeting_id, user_id, reservation_date, start_time, end_time, amount,
                   memo, state, settlement_id, created_at, updated_at
            FROM reservations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a user's reservations.
    pub async fn count_by_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_reservations_by_user");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Fail every pending reservation created before `cutoff`, together with
    /// its unpaid payment. Returns the number of reservations released.
    pub async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("expire_pending_reservations");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            WITH expired AS (
                UPDATE reservations
                SET state = 'payment_fail', updated_at = NOW()
                WHERE state = 'pending' AND created_at < $1
                RETURNING id
            ), failed AS (
                UPDATE payments p
                SET pay_state = 'fail', fail_reason = 'payment window expired', updated_at = NOW()
                FROM expired e
                WHERE p.reservation_id = e.id AND p.pay_state = 'before'
                RETURNING p.id
            )
            SELECT COUNT(*) FROM expired
            "#,
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
