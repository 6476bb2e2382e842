//! Closes meetings whose date window has passed.

use chrono::Local;
use persistence::repositories::MeetingRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

pub struct CloseExpiredMeetingsJob {
    meetings: MeetingRepository,
}

impl CloseExpiredMeetingsJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            meetings: MeetingRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for CloseExpiredMeetingsJob {
    fn name(&self) -> &'static str {
        "close_expired_meetings"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let today = Local::now().date_naive();
        let closed = self
            .meetings
            .close_expired(today)
            .await
            .map_err(|e| format!("Failed to close expired meetings: {}", e))?;

        if closed > 0 {
            info!(closed, today = %today, "Closed expired meetings");
        }
        Ok(())
    }
}
