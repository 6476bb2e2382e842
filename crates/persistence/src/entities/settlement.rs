//! Settlement entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::settlement::{SettlementCandidate, SettlementResponse};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the settlements table.
#[derive(Debug, Clone, FromRow)]
pub struct SettlementEntity {
    pub id: Uuid,
    pub host_id: Uuid,
    pub amount: i64,
    pub reservation_count: i32,
    pub settled_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<SettlementEntity> for SettlementResponse {
    fn from(entity: SettlementEntity) -> Self {
        Self {
            settlement_id: entity.id,
            amount: entity.amount,
            reservation_count: entity.reservation_count,
            settled_date: entity.settled_date,
            created_at: entity.created_at,
        }
    }
}

/// Reservation row eligible for settlement.
#[derive(Debug, Clone, FromRow)]
pub struct SettlementCandidateEntity {
    pub reservation_id: Uuid,
    pub meeting_id: Uuid,
    pub host_id: Uuid,
    pub amount: i64,
}

impl From<SettlementCandidateEntity> for SettlementCandidate {
    fn from(entity: SettlementCandidateEntity) -> Self {
        Self {
            reservation_id: entity.reservation_id,
            meeting_id: entity.meeting_id,
            host_id: entity.host_id,
            amount: entity.amount,
        }
    }
}
