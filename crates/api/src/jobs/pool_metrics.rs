//! Publishes connection pool gauges and flags a saturated pool.

use persistence::metrics::{record_pool_metrics, PoolSnapshot};
use sqlx::PgPool;
use tracing::warn;

use super::scheduler::{Job, JobFrequency};

/// Utilization at which the pool is reported as saturated.
const SATURATION_WARN: f64 = 0.9;

pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Booking holds a meeting row lock for the whole transaction, so a full
/// pool shows up as reservation latency first.
fn is_saturated(snapshot: &PoolSnapshot) -> bool {
    snapshot.max > 0 && snapshot.utilization() >= SATURATION_WARN
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(15)
    }

    async fn execute(&self) -> Result<(), String> {
        let snapshot = record_pool_metrics(&self.pool);
        if is_saturated(&snapshot) {
            warn!(
                in_use = snapshot.in_use(),
                max = snapshot.max,
                "Database pool is nearly exhausted"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn snapshot(open: u32, idle: u32, max: u32) -> PoolSnapshot {
        PoolSnapshot { open, idle, max }
    }

    #[test]
    fn test_saturation() {
        assert!(is_saturated(&snapshot(10, 1, 10)));
        assert!(is_saturated(&snapshot(20, 0, 20)));
        assert!(!is_saturated(&snapshot(10, 5, 10)));
        assert!(!is_saturated(&snapshot(0, 0, 0)));
    }

    #[tokio::test]
    async fn test_lazy_pool_is_idle() {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect_lazy("postgres://localhost/momo_unused")
            .unwrap();
        let job = PoolMetricsJob::new(pool);
        assert_eq!(job.frequency(), JobFrequency::Seconds(15));
        assert!(job.execute().await.is_ok());

        let snapshot = PoolSnapshot::of(&job.pool);
        assert_eq!(snapshot.in_use(), 0);
        assert_eq!(snapshot.max, 4);
    }
}
