//! Reservation domain models.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a reservation.
///
/// `Pending` → `PaymentSuccess` | `PaymentFail` → `Accept` | `Reject`.
/// `Cancel` is reachable from `Pending` and `PaymentSuccess` by the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    Pending,
    PaymentSuccess,
    PaymentFail,
    Accept,
    Reject,
    Cancel,
}

impl ReservationState {
    /// States that hold a seat in the slot.
    pub const OCCUPYING: [ReservationState; 3] = [
        ReservationState::Pending,
        ReservationState::PaymentSuccess,
        ReservationState::Accept,
    ];

    /// States whose payment went through and has not been refunded.
    pub const PAID: [ReservationState; 2] =
        [ReservationState::PaymentSuccess, ReservationState::Accept];

    pub fn is_occupying(&self) -> bool {
        Self::OCCUPYING.contains(self)
    }

    pub fn is_paid(&self) -> bool {
        Self::PAID.contains(self)
    }

    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ReservationState) -> bool {
        use ReservationState::*;
        matches!(
            (*self, next),
            (Pending, PaymentSuccess)
                | (Pending, PaymentFail)
                | (Pending, Cancel)
                | (PaymentSuccess, Accept)
                | (PaymentSuccess, Reject)
                | (PaymentSuccess, Cancel)
        )
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationState::Pending => "PENDING",
            ReservationState::PaymentSuccess => "PAYMENT_SUCCESS",
            ReservationState::PaymentFail => "PAYMENT_FAIL",
            ReservationState::Accept => "ACCEPT",
            ReservationState::Reject => "REJECT",
            ReservationState::Cancel => "CANCEL",
        };
        write!(f, "{}", s)
    }
}

/// A reserved (or requested) date and time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl ReservationSlot {
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            date,
            start_time,
            end_time,
        }
    }

    /// Half-open overlap: touching ranges do not overlap.
    pub fn overlaps(&self, other: &ReservationSlot) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// Duration in whole minutes.
    pub fn minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Requested date and times.
///
/// Every field is optional at the JSON level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDateRequest {
    #[validate(required(message = "reservationDate must not be empty"))]
    pub reservation_date: Option<NaiveDate>,
    #[validate(required(message = "startTime must not be empty"))]
    pub start_time: Option<NaiveTime>,
    #[validate(required(message = "endTime must not be empty"))]
    pub end_time: Option<NaiveTime>,
}

/// Request body for `POST /meetings/{id}/reservations`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    #[validate(required(message = "dateInfo must not be empty"), nested)]
    pub date_info: Option<ReservationDateRequest>,

    #[validate(
        required(message = "amount must not be empty"),
        range(min = 0, message = "amount must not be negative")
    )]
    pub amount: Option<i64>,

    #[validate(length(max = 500, message = "reservationMemo must be at most 500 characters"))]
    pub reservation_memo: Option<String>,
}

impl ReservationRequest {
    /// The requested slot, once validation has passed.
    pub fn slot(&self) -> Option<ReservationSlot> {
        let info = self.date_info.as_ref()?;
        Some(ReservationSlot::new(
            info.reservation_date?,
            info.start_time?,
            info.end_time?,
        ))
    }
}

/// Request body for the host's accept/reject decision.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDecisionRequest {
    pub is_accepted: bool,
}

/// A reservation as stored.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub slot: ReservationSlot,
    pub amount: i64,
    pub memo: Option<String>,
    pub state: ReservationState,
    pub settlement_id: Option<Uuid>,
}
