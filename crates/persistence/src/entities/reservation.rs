//! Reservation entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::meeting::{ApplicationConfirmed, ApplicationRequest, ReservedTime};
use domain::models::{Reservation, ReservationSlot, ReservationState};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for reservation_state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reservation_state", rename_all = "snake_case")]
pub enum ReservationStateDb {
    Pending,
    PaymentSuccess,
    PaymentFail,
    Accept,
    Reject,
    Cancel,
}

impl From<ReservationStateDb> for ReservationState {
    fn from(db: ReservationStateDb) -> Self {
        match db {
            ReservationStateDb::Pending => ReservationState::Pending,
            ReservationStateDb::PaymentSuccess => ReservationState::PaymentSuccess,
            ReservationStateDb::PaymentFail => ReservationState::PaymentFail,
            ReservationStateDb::Accept => ReservationState::Accept,
            ReservationStateDb::Reject => ReservationState::Reject,
            ReservationStateDb::Cancel => ReservationState::Cancel,
        }
    }
}

impl From<ReservationState> for ReservationStateDb {
    fn from(state: ReservationState) -> Self {
        match state {
            ReservationState::Pending => ReservationStateDb::Pending,
            ReservationState::PaymentSuccess => ReservationStateDb::PaymentSuccess,
            ReservationState::PaymentFail => ReservationStateDb::PaymentFail,
            ReservationState::Accept => ReservationStateDb::Accept,
            ReservationState::Reject => ReservationStateDb::Reject,
            ReservationState::Cancel => ReservationStateDb::Cancel,
        }
    }
}

/// Database row mapping for the reservations table.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationEntity {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub amount: i64,
    pub memo: Option<String>,
    pub state: ReservationStateDb,
    pub settlement_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationEntity {
    pub fn slot(&self) -> ReservationSlot {
        ReservationSlot::new(self.reservation_date, self.start_time, self.end_time)
    }
}

impl From<ReservationEntity> for Reservation {
    fn from(entity: ReservationEntity) -> Self {
        Self {
            id: entity.id,
            meeting_id: entity.meeting_id,
            user_id: entity.user_id,
            slot: entity.slot(),
            amount: entity.amount,
            memo: entity.memo,
            state: entity.state.into(),
            settlement_id: entity.settlement_id,
        }
    }
}

/// Occupied time range on a meeting date.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct OccupiedSlotEntity {
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<OccupiedSlotEntity> for ReservationSlot {
    fn from(entity: OccupiedSlotEntity) -> Self {
        ReservationSlot::new(entity.reservation_date, entity.start_time, entity.end_time)
    }
}

/// Reservation joined with its applicant, for the host's my-page view.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationEntity {
    pub reservation_id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub image_url: Option<String>,
    pub email: String,
    pub state: ReservationStateDb,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub memo: Option<String>,
}

impl ApplicationEntity {
    fn reserved_time(&self) -> ReservedTime {
        ReservedTime::new(self.reservation_date, self.start_time, self.end_time)
    }
}

impl From<ApplicationEntity> for ApplicationRequest {
    fn from(entity: ApplicationEntity) -> Self {
        Self {
            date_time_info: entity.reserved_time(),
            reservation_id: entity.reservation_id,
            user_id: entity.user_id,
            nickname: entity.nickname,
            image_url: entity.image_url,
            reservation_state: entity.state.into(),
            message: entity.memo,
        }
    }
}

impl From<ApplicationEntity> for ApplicationConfirmed {
    fn from(entity: ApplicationEntity) -> Self {
        Self {
            date_time_info: entity.reserved_time(),
            reservation_id: entity.reservation_id,
            user_id: entity.user_id,
            nickname: entity.nickname,
            image_url: entity.image_url,
            reservation_state: entity.state.into(),
            email: entity.email,
            message: entity.memo,
        }
    }
}
