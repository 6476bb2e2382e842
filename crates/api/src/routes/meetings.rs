//! Meeting routes: create, search, detail, host close and my-page views.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::meeting::{
    CreateMeetingRequest, CreateMeetingResponse, MeetingDetailResponse, MeetingHostResponse,
    MeetingParticipantResponse, MeetingResponse, MeetingSearchQuery,
};
use shared::pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::services::MeetingService;

/// POST /meetings
pub async fn create_meeting(
    State(state): State<AppState>,
    auth: UserAuth,
    ValidatedJson(request): ValidatedJson<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<CreateMeetingResponse>), ApiError> {
    let response = MeetingService::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Public search.
///
/// GET /meetings?keyword&category&page&size
pub async fn search_meetings(
    State(state): State<AppState>,
    Query(query): Query<MeetingSearchQuery>,
) -> Result<Json<Page<MeetingResponse>>, ApiError> {
    let page = MeetingService::new(state.pool.clone())
        .search(&query)
        .await?;
    Ok(Json(page))
}

/// GET /meetings/:id
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
) -> Result<Json<MeetingDetailResponse>, ApiError> {
    let meeting = MeetingService::new(state.pool.clone())
        .detail(meeting_id)
        .await?;
    Ok(Json(meeting))
}

/// PATCH /meetings/:id/close
pub async fn close_meeting(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(meeting_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    MeetingService::new(state.pool.clone())
        .close(auth.user_id, meeting_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /mypage/meetings/hosts?page&size
pub async fn hosted_meetings(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MeetingHostResponse>>, ApiError> {
    let meetings = MeetingService::new(state.pool.clone())
        .hosted(auth.user_id, &page)
        .await?;
    Ok(Json(meetings))
}

/// GET /mypage/meetings/participants?page&size
pub async fn participated_meetings(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MeetingParticipantResponse>>, ApiError> {
    let meetings = MeetingService::new(state.pool.clone())
        .participated(auth.user_id, &page)
        .await?;
    Ok(Json(meetings))
}
