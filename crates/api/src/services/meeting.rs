//! Meeting service: listing, search, host close and the my-page views.

use domain::models::meeting::{
    Applications, CreateMeetingRequest, CreateMeetingResponse, MeetingDetailResponse,
    MeetingHostResponse, MeetingParticipantResponse, MeetingResponse, MeetingSearchQuery,
    ParticipantReservation, ReservedTime,
};
use domain::models::ReservationState;
use persistence::entities::{ApplicationEntity, MeetingEntity};
use persistence::repositories::{
    MeetingRepository, MeetingSearch, ReservationRepository, UserRepository,
};
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum MeetingError {
    #[error("Meeting not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Only the host can close the meeting")]
    NotHost,

    #[error("Meeting is already closed")]
    AlreadyClosed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MeetingError> for ApiError {
    fn from(err: MeetingError) -> Self {
        match err {
            MeetingError::NotFound | MeetingError::UserNotFound => {
                ApiError::NotFound(err.to_string())
            }
            MeetingError::NotHost => ApiError::Forbidden(err.to_string()),
            MeetingError::AlreadyClosed => ApiError::Rejected {
                code: "meeting_closed",
                message: err.to_string(),
            },
            MeetingError::Database(e) => e.into(),
        }
    }
}

pub struct MeetingService {
    meetings: MeetingRepository,
    reservations: ReservationRepository,
    users: UserRepository,
}

impl MeetingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            meetings: MeetingRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Open a new meeting hosted by `host_id`.
    pub async fn create(
        &self,
        host_id: Uuid,
        request: &CreateMeetingRequest,
    ) -> Result<CreateMeetingResponse, MeetingError> {
        if self.users.find_active_by_id(host_id).await?.is_none() {
            return Err(MeetingError::UserNotFound);
        }

        let meeting_id = self.meetings.create(host_id, request).await?;
        info!(
            meeting_id = %meeting_id,
            host_id = %host_id,
            category = request.category.as_str(),
            "Meeting created"
        );
        Ok(CreateMeetingResponse { meeting_id })
    }

    /// Public search, newest first.
    pub async fn search(
        &self,
        query: &MeetingSearchQuery,
    ) -> Result<Page<MeetingResponse>, MeetingError> {
        let page = PageRequest::new(query.page, query.size);
        let filter = MeetingSearch {
            keyword: query.keyword.as_deref(),
            category: query.category,
        };

        let rows = self
            .meetings
            .search(&filter, page.limit(), page.offset())
            .await?;
        let total = self.meetings.count_search(&filter).await?;

        let content = rows.into_iter().map(MeetingResponse::from).collect();
        Ok(Page::new(content, &page, total))
    }

    pub async fn detail(&self, meeting_id: Uuid) -> Result<MeetingDetailResponse, MeetingError> {
        self.meetings
            .find_by_id(meeting_id)
            .await?
            .map(MeetingDetailResponse::from)
            .ok_or(MeetingError::NotFound)
    }

    /// Host closes their meeting early.
    pub async fn close(&self, host_id: Uuid, meeting_id: Uuid) -> Result<(), MeetingError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or(MeetingError::NotFound)?;
        if meeting.host_id != host_id {
            return Err(MeetingError::NotHost);
        }
        if !self.meetings.close(meeting_id).await? {
            return Err(MeetingError::AlreadyClosed);
        }
        info!(meeting_id = %meeting_id, host_id = %host_id, "Meeting closed by host");
        Ok(())
    }

    /// Meetings the user hosts, newest first, each with its paid and accepted
    /// applications.
    pub async fn hosted(
        &self,
        host_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<MeetingHostResponse>, MeetingError> {
        let total = self.meetings.count_by_host(host_id).await?;
        let meetings = self
            .meetings
            .find_by_host(host_id, page.limit(), page.offset())
            .await?;
        if meetings.is_empty() {
            return Ok(Page::new(Vec::new(), page, total));
        }

        let ids: Vec<Uuid> = meetings.iter().map(|m| m.id).collect();
        let mut applications = group_applications(self.reservations.find_applications(&ids).await?);

        let content = meetings
            .into_iter()
            .map(|meeting| {
                let applications = applications.remove(&meeting.id).unwrap_or_default();
                MeetingHostResponse {
                    meeting: meeting.into(),
                    applications,
                }
            })
            .collect();
        Ok(Page::new(content, page, total))
    }

    /// Meetings the user reserved, one entry per reservation, newest first.
    pub async fn participated(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<MeetingParticipantResponse>, MeetingError> {
        let total = self.reservations.count_by_user(user_id).await?;
        let reservations = self
            .reservations
            .find_by_user(user_id, page.limit(), page.offset())
            .await?;
        if reservations.is_empty() {
            return Ok(Page::new(Vec::new(), page, total));
        }

        let mut ids: Vec<Uuid> = reservations.iter().map(|r| r.meeting_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let meetings: HashMap<Uuid, MeetingEntity> = self
            .meetings
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let content = reservations
            .into_iter()
            .filter_map(|reservation| {
                let meeting = meetings.get(&reservation.meeting_id)?.clone();
                Some(MeetingParticipantResponse {
                    meeting: meeting.into(),
                    reservation: ParticipantReservation {
                        reservation_id: reservation.id,
                        reservation_state: reservation.state.into(),
                        date_time_info: ReservedTime::new(
                            reservation.reservation_date,
                            reservation.start_time,
                            reservation.end_time,
                        ),
                        amount: reservation.amount,
                    },
                })
            })
            .collect();
        Ok(Page::new(content, page, total))
    }
}

/// Split applications per meeting: paid ones are requests, accepted ones
/// are confirmed.
fn group_applications(rows: Vec<ApplicationEntity>) -> HashMap<Uuid, Applications> {
    let mut grouped: HashMap<Uuid, Applications> = HashMap::new();
    for row in rows {
        let entry = grouped.entry(row.meeting_id).or_default();
        match ReservationState::from(row.state) {
            ReservationState::PaymentSuccess => entry.requests.push(row.into()),
            ReservationState::Accept => entry.confirmed.push(row.into()),
            _ => {}
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use persistence::entities::ReservationStateDb;

    fn application(meeting_id: Uuid, state: ReservationStateDb) -> ApplicationEntity {
        ApplicationEntity {
            reservation_id: Uuid::new_v4(),
            meeting_id,
            user_id: Uuid::new_v4(),
            nickname: "guest".to_string(),
            image_url: None,
            email: "guest@momo.dev".to_string(),
            state,
            reservation_date: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            memo: Some("hello".to_string()),
        }
    }

    #[test]
    fn test_group_applications_splits_by_state() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let grouped = group_applications(vec![
            application(first, ReservationStateDb::PaymentSuccess),
            application(first, ReservationStateDb::Accept),
            application(first, ReservationStateDb::PaymentSuccess),
            application(second, ReservationStateDb::Accept),
        ]);

        let a = &grouped[&first];
        assert_eq!(a.requests.len(), 2);
        assert_eq!(a.confirmed.len(), 1);
        assert_eq!(a.confirmed[0].email, "guest@momo.dev");
        assert_eq!(a.requests[0].date_time_info.time, "10:00~12:00");

        let b = &grouped[&second];
        assert!(b.requests.is_empty());
        assert_eq!(b.confirmed.len(), 1);
    }

    #[test]
    fn test_group_applications_ignores_other_states() {
        let meeting = Uuid::new_v4();
        let grouped = group_applications(vec![application(meeting, ReservationStateDb::Pending)]);
        let entry = &grouped[&meeting];
        assert!(entry.requests.is_empty());
        assert!(entry.confirmed.is_empty());
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            ApiError::from(MeetingError::NotHost),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(MeetingError::AlreadyClosed),
            ApiError::Rejected {
                code: "meeting_closed",
                ..
            }
        ));
    }
}
