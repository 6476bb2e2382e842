//! Meeting question models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use uuid::Uuid;
use validator::Validate;

/// Request body for `POST /meetings/{id}/questions`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(
        length(max = 1000, message = "Question must be at most 1000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWriter {
    pub user_id: Uuid,
    pub nickname: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub question_id: Uuid,
    pub meeting_id: Uuid,
    pub writer: QuestionWriter,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
