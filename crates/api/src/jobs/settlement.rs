//! Daily host settlement.

use chrono::Local;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};
use crate::services::SettlementService;

pub struct SettlementJob {
    service: SettlementService,
    grace_days: i32,
}

impl SettlementJob {
    pub fn new(pool: PgPool, grace_days: i32) -> Self {
        Self {
            service: SettlementService::new(pool),
            grace_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for SettlementJob {
    fn name(&self) -> &'static str {
        "settlement"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let today = Local::now().date_naive();
        let summary = self
            .service
            .run(today, self.grace_days)
            .await
            .map_err(|e| format!("Settlement run failed: {}", e))?;

        info!(
            hosts = summary.hosts,
            reservations = summary.reservations,
            total_amount = summary.total_amount,
            "Settlement run finished"
        );
        Ok(())
    }
}
