//! Settlement domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One paid reservation that is ready to be paid out to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementCandidate {
    pub reservation_id: Uuid,
    pub meeting_id: Uuid,
    pub host_id: Uuid,
    pub amount: i64,
}

/// Payout owed to a single host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettlement {
    pub host_id: Uuid,
    pub amount: i64,
    pub reservation_ids: Vec<Uuid>,
}

/// Settlement row as shown to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResponse {
    pub settlement_id: Uuid,
    pub amount: i64,
    pub reservation_count: i32,
    pub settled_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Summary of one settlement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementRunSummary {
    pub hosts: usize,
    pub reservations: usize,
    pub total_amount: i64,
}
