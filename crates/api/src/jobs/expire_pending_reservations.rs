//! Releases slots held by reservations that were never paid.

use chrono::{Duration, Utc};
use persistence::repositories::ReservationRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Moves `PENDING` reservations older than the timeout to `PAYMENT_FAIL`.
pub struct ExpirePendingReservationsJob {
    reservations: ReservationRepository,
    timeout: Duration,
}

impl ExpirePendingReservationsJob {
    pub fn new(pool: PgPool, timeout_minutes: i64) -> Self {
        Self {
            reservations: ReservationRepository::new(pool),
            timeout: Duration::minutes(timeout_minutes),
        }
    }

    /// Check interval: a fifth of the timeout, between 1 and 10 minutes.
    fn interval_minutes(&self) -> u64 {
        let fifth = self.timeout.num_minutes() / 5;
        fifth.clamp(1, 10) as u64
    }
}

#[async_trait::async_trait]
impl Job for ExpirePendingReservationsJob {
    fn name(&self) -> &'static str {
        "expire_pending_reservations"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes())
    }

    async fn execute(&self) -> Result<(), String> {
        let cutoff = Utc::now() - self.timeout;
        let expired = self
            .reservations
            .expire_pending(cutoff)
            .await
            .map_err(|e| format!("Failed to expire pending reservations: {}", e))?;

        if expired > 0 {
            info!(expired, cutoff = %cutoff, "Expired unpaid reservations");
        }
        Ok(())
    }
}
