//! Settlement repository for database operations.

use chrono::NaiveDate;
use domain::models::HostSettlement;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::entities::{SettlementCandidateEntity, SettlementEntity};
use crate::metrics::QueryTimer;

/// Repository for settlement-related database operations.
#[derive(Clone)]
pub struct SettlementRepository {
    pool: PgPool,
}

impl SettlementRepository {
    /// Creates a new SettlementRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Paid reservations that can be settled on `today`.
    ///
    /// A reservation qualifies when its meeting is closed, the meeting ended
    /// at least `grace_days` days ago, its payment went through, and it has
    /// not been settled yet.
    pub async fn find_candidates(
        &self,
        today: NaiveDate,
        grace_days: i32,
    ) -> Result<Vec<SettlementCandidateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_settlement_candidates");
        let result = sqlx::query_as::<_, SettlementCandidateEntity>(
            r#"
            SELECT r.id AS reservation_id, r.meeting_id, m.host_id, r.amount
            FROM reservations r
            JOIN meetings m ON m.id = r.meeting_id
            WHERE m.meeting_state = 'close'
              AND m.end_date + $2::int <= $1
              AND r.state IN ('payment_success', 'accept')
              AND r.settlement_id IS NULL
            ORDER BY m.host_id, r.created_at
            "#,
        )
        .bind(today)
        .bind(grace_days)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Settle one host in a single transaction.
    ///
    /// Inserts the settlement row, stamps the reservations with it and
    /// credits the host's points. Returns `None` and rolls back when some of
    /// the reservations were settled, cancelled or rejected concurrently.
    pub async fn settle_host(
        &self,
        settlement: &HostSettlement,
        settled_date: NaiveDate,
    ) -> Result<Option<SettlementEntity>, sqlx::Error> {
        let timer = QueryTimer::new("settle_host");
        let count = settlement.reservation_ids.len();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SettlementEntity>(
            r#"
            INSERT INTO settlements (host_id, amount, reservation_count, settled_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, host_id, amount, reservation_count, settled_date, created_at
            "#,
        )
        .bind(settlement.host_id)
        .bind(settlement.amount)
        .bind(i32::try_from(count).unwrap_or(i32::MAX))
        .bind(settled_date)
        .fetch_one(&mut *tx)
        .await?;

        let stamped = sqlx::query(
            r#"
            UPDATE reservations
            SET settlement_id = $1, updated_at = NOW()
            WHERE id = ANY($2)
              AND settlement_id IS NULL
              AND state IN ('payment_success', 'accept')
            "#,
        )
        .bind(row.id)
        .bind(&settlement.reservation_ids)
        .execute(&mut *tx)
        .await?;

        if stamped.rows_affected() != count as u64 {
            warn!(
                host_id = %settlement.host_id,
                expected = count,
                stamped = stamped.rows_affected(),
                "Reservations changed during settlement, skipping host"
            );
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE users
            SET point = point + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(settlement.host_id)
        .bind(settlement.amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(row))
    }

    /// A host's settlements, newest first.
    pub async fn find_by_host(
        &self,
        host_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SettlementEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_settlements_by_host");
        let result = sqlx::query_as::<_, SettlementEntity>(
            r#"
            SELECT id, host_id, amount, reservation_count, settled_date, created_at
            FROM settlements
            WHERE host_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(host_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count a host's settlements.
    pub async fn count_by_host(&self, host_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_settlements_by_host");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM settlements WHERE host_id = $1")
                .bind(host_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}
