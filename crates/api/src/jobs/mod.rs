//! Background job scheduler and job implementations.

mod close_expired_meetings;
mod expire_pending_reservations;
mod pool_metrics;
mod scheduler;
mod settlement;

pub use close_expired_meetings::CloseExpiredMeetingsJob;
pub use expire_pending_reservations::ExpirePendingReservationsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
pub use settlement::SettlementJob;
