//! Query timing and connection pool gauges.
//!
//! Every repository call is wrapped in a [`QueryTimer`]. Reservation and
//! settlement writes hold row locks, so slow queries are also logged.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::warn;

/// Queries slower than this are logged at `warn`.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(500);

/// Times one named query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_meeting_by_id");
/// let result = sqlx::query_as::<_, MeetingEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
#[must_use = "a timer records nothing until `record` is called"]
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Record the elapsed time and return it.
    pub fn record(self) -> Duration {
        let elapsed = self.start.elapsed();
        histogram!("momo_db_query_duration_seconds", "query" => self.query)
            .record(elapsed.as_secs_f64());
        if is_slow(elapsed) {
            warn!(
                query = self.query,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow database query"
            );
        }
        elapsed
    }
}

fn is_slow(elapsed: Duration) -> bool {
    elapsed >= SLOW_QUERY_THRESHOLD
}

/// Point-in-time view of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub open: u32,
    pub idle: u32,
    pub max: u32,
}

impl PoolSnapshot {
    pub fn of(pool: &PgPool) -> Self {
        let open = pool.size();
        Self {
            open,
            idle: u32::try_from(pool.num_idle()).unwrap_or(open).min(open),
            max: pool.options().get_max_connections(),
        }
    }

    pub fn in_use(&self) -> u32 {
        self.open - self.idle
    }

    /// Share of `max` currently checked out, in `0.0..=1.0`.
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (f64::from(self.in_use()) / f64::from(self.max)).min(1.0)
    }
}

/// Publish pool gauges and return the snapshot they were taken from.
pub fn record_pool_metrics(pool: &PgPool) -> PoolSnapshot {
    let snapshot = PoolSnapshot::of(pool);
    gauge!("momo_db_connections_in_use").set(f64::from(snapshot.in_use()));
    gauge!("momo_db_connections_idle").set(f64::from(snapshot.idle));
    gauge!("momo_db_connections_max").set(f64::from(snapshot.max));
    gauge!("momo_db_pool_utilization").set(snapshot.utilization());
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_without_recorder() {
        let elapsed = QueryTimer::new("settle_host").record();
        assert!(elapsed < SLOW_QUERY_THRESHOLD);
    }

    #[test]
    fn test_slow_threshold() {
        assert!(!is_slow(Duration::from_millis(499)));
        assert!(is_slow(SLOW_QUERY_THRESHOLD));
    }

    #[test]
    fn test_snapshot_utilization() {
        let snapshot = PoolSnapshot {
            open: 8,
            idle: 3,
            max: 10,
        };
        assert_eq!(snapshot.in_use(), 5);
        assert!((snapshot.utilization() - 0.5).abs() < f64::EPSILON);

        let empty = PoolSnapshot {
            open: 0,
            idle: 0,
            max: 0,
        };
        assert_eq!(empty.utilization(), 0.0);
    }
}
