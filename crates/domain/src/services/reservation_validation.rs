//! Reservation admission rules.
//!
//! Decides whether a requested slot may be reserved on a meeting and what
//! it costs. Everything here is pure: the caller loads the meeting and the
//! occupying reservations (inside the transaction that locks the meeting)
//! and passes them in.

use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;
use uuid::Uuid;

use crate::models::meeting::{DatePolicy, DateTimeInfo, Meeting};
use crate::models::reservation::ReservationSlot;

/// Why a reservation request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReservationRejection {
    #[error("Meeting is closed")]
    MeetingClosed,

    #[error("Hosts cannot reserve their own meeting")]
    HostCannotReserve,

    #[error("Requested time is not offered by the meeting")]
    InvalidReservationTime,

    #[error("The requested time is fully booked")]
    FullOfPeople,

    #[error("Amount {actual} does not match the price {expected}")]
    AmountDoesNotMatch { expected: i64, actual: i64 },
}

impl ReservationRejection {
    /// Machine-readable code returned in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ReservationRejection::MeetingClosed => "meeting_closed",
            ReservationRejection::HostCannotReserve => "host_cannot_reserve",
            ReservationRejection::InvalidReservationTime => "invalid_reservation_time",
            ReservationRejection::FullOfPeople => "full_of_people",
            ReservationRejection::AmountDoesNotMatch { .. } => "amount_does_not_match",
        }
    }
}

/// Inputs of one admission decision.
#[derive(Debug, Clone, Copy)]
pub struct ReservationAttempt<'a> {
    pub requester: Uuid,
    pub slot: &'a ReservationSlot,
    pub amount: i64,
    /// Slots of occupying reservations on the same meeting and date.
    pub occupied: &'a [ReservationSlot],
    pub now: NaiveDateTime,
}

/// Runs every admission rule in order and returns the expected amount.
pub fn validate_reservation(
    meeting: &Meeting,
    attempt: ReservationAttempt<'_>,
) -> Result<i64, ReservationRejection> {
    if !meeting.is_open() {
        return Err(ReservationRejection::MeetingClosed);
    }
    if meeting.is_hosted_by(attempt.requester) {
        return Err(ReservationRejection::HostCannotReserve);
    }

    check_availability(&meeting.date_time_info, attempt.slot, attempt.now)?;
    check_capacity(meeting.personnel, attempt.slot, attempt.occupied)?;

    let expected = compute_amount(&meeting.date_time_info, meeting.price, attempt.slot);
    if expected != attempt.amount {
        return Err(ReservationRejection::AmountDoesNotMatch {
            expected,
            actual: attempt.amount,
        });
    }
    Ok(expected)
}

/// The slot lies inside a window the meeting offers and is in the future.
pub fn check_availability(
    info: &DateTimeInfo,
    slot: &ReservationSlot,
    now: NaiveDateTime,
) -> Result<(), ReservationRejection> {
    let start = slot.date.and_time(slot.start_time);
    let end = slot.date.and_time(slot.end_time);

    let within_period = slot.date >= info.start_date && slot.date <= info.end_date;
    if start >= end || start <= now || !within_period {
        return Err(ReservationRejection::InvalidReservationTime);
    }

    let offered = match info.date_policy {
        DatePolicy::Free => fits_free_window(info, slot),
        DatePolicy::OneDay => slot.date == info.start_date && fits_session(info, start, end),
        DatePolicy::Period => fits_session(info, start, end),
    };

    if offered {
        Ok(())
    } else {
        Err(ReservationRejection::InvalidReservationTime)
    }
}

fn fits_free_window(info: &DateTimeInfo, slot: &ReservationSlot) -> bool {
    let on_the_hour = |t: chrono::NaiveTime| t.minute() == 0 && t.second() == 0;
    if !on_the_hour(slot.start_time) || !on_the_hour(slot.end_time) {
        return false;
    }
    if slot.start_time < info.start_time || slot.end_time > info.end_time {
        return false;
    }
    let hours = slot.minutes() / 60;
    hours >= 1 && hours <= i64::from(info.max_time)
}

fn fits_session(info: &DateTimeInfo, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    let length = info.session_length();
    info.date_times
        .iter()
        .any(|&opens| opens <= start && end <= opens + length)
}

/// Fewer than `personnel` occupying reservations overlap the slot.
pub fn check_capacity(
    personnel: i32,
    slot: &ReservationSlot,
    occupied: &[ReservationSlot],
) -> Result<(), ReservationRejection> {
    let seats = usize::try_from(personnel).unwrap_or(0);
    let overlapping = occupied.iter().filter(|other| other.overlaps(slot)).count();
    if overlapping >= seats {
        return Err(ReservationRejection::FullOfPeople);
    }
    Ok(())
}

/// Price of a slot: per hour for `Free`, per session otherwise.
pub fn compute_amount(info: &DateTimeInfo, price: i64, slot: &ReservationSlot) -> i64 {
    match info.date_policy {
        DatePolicy::Free => price.saturating_mul(slot.minutes() / 60),
        DatePolicy::OneDay | DatePolicy::Period => price,
    }
}
