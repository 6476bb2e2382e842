//! Meeting question routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::question::{CreateQuestionRequest, QuestionResponse};
use shared::pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{UserAuth, ValidatedJson};
use crate::services::QuestionService;

/// POST /meetings/:id/questions
pub async fn create_question(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(meeting_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let question = QuestionService::new(state.pool.clone())
        .ask(auth.user_id, meeting_id, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /meetings/:id/questions?page&size
pub async fn list_questions(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<QuestionResponse>>, ApiError> {
    let questions = QuestionService::new(state.pool.clone())
        .list(meeting_id, &page)
        .await?;
    Ok(Json(questions))
}
