//! Reservation routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::payment::PaymentResponse;
use domain::models::reservation::{ReservationDecisionRequest, ReservationRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::services::ReservationService;

fn service(state: &AppState) -> ReservationService {
    ReservationService::new(
        state.pool.clone(),
        state.gateway.clone(),
        &state.config.payment,
    )
}

/// Reserve a slot. Responds with the checkout descriptor.
///
/// POST /meetings/:id/reservations
pub async fn reserve(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(meeting_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let payment = service(&state)
        .reserve(auth.user_id, meeting_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Host accepts or rejects a paid reservation.
///
/// PATCH /meetings/:id/reservations/:reservation_id
pub async fn decide(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((meeting_id, reservation_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<ReservationDecisionRequest>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .decide(auth.user_id, meeting_id, reservation_id, request.is_accepted)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Guest cancels their reservation.
///
/// DELETE /meetings/:id/reservations/:reservation_id
pub async fn cancel(
    State(state): State<AppState>,
    auth: UserAuth,
    Path((meeting_id, reservation_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    service(&state)
        .cancel(auth.user_id, meeting_id, reservation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
