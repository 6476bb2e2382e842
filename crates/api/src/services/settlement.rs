//! Host payout settlement.

use chrono::NaiveDate;
use domain::models::settlement::SettlementResponse;
use domain::models::{SettlementCandidate, SettlementRunSummary};
use domain::services::group_by_host;
use persistence::repositories::SettlementRepository;
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::middleware::metrics::record_settlement_run;

pub struct SettlementService {
    settlements: SettlementRepository,
}

impl SettlementService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            settlements: SettlementRepository::new(pool),
        }
    }

    /// Settle every eligible reservation as of `today`.
    ///
    /// Each host is settled in its own transaction; a host whose
    /// reservations changed underneath is skipped and picked up next run.
    pub async fn run(
        &self,
        today: NaiveDate,
        grace_days: i32,
    ) -> Result<SettlementRunSummary, sqlx::Error> {
        let candidates: Vec<SettlementCandidate> = self
            .settlements
            .find_candidates(today, grace_days)
            .await?
            .into_iter()
            .map(SettlementCandidate::from)
            .collect();

        let mut summary = SettlementRunSummary::default();
        if candidates.is_empty() {
            return Ok(summary);
        }

        for host in group_by_host(&candidates) {
            match self.settlements.settle_host(&host, today).await? {
                Some(settlement) => {
                    info!(
                        settlement_id = %settlement.id,
                        host_id = %host.host_id,
                        amount = host.amount,
                        reservations = host.reservation_ids.len(),
                        "Host settled"
                    );
                    summary.hosts += 1;
                    summary.reservations += host.reservation_ids.len();
                    summary.total_amount += host.amount;
                }
                None => warn!(host_id = %host.host_id, "Host settlement skipped"),
            }
        }

        record_settlement_run(summary.hosts, summary.total_amount);
        Ok(summary)
    }

    /// A host's settlements, newest first.
    pub async fn list_for_host(
        &self,
        host_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<SettlementResponse>, sqlx::Error> {
        let rows = self
            .settlements
            .find_by_host(host_id, page.limit(), page.offset())
            .await?;
        let total = self.settlements.count_by_host(host_id).await?;
        let content = rows.into_iter().map(SettlementResponse::from).collect();
        Ok(Page::new(content, page, total))
    }
}
