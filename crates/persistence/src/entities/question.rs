//! Question entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::question::{QuestionResponse, QuestionWriter};
use sqlx::FromRow;
use uuid::Uuid;

/// Question row joined with its writer.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionEntity {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub writer_id: Uuid,
    pub writer_nickname: String,
    pub writer_image_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<QuestionEntity> for QuestionResponse {
    fn from(entity: QuestionEntity) -> Self {
        Self {
            question_id: entity.id,
            meeting_id: entity.meeting_id,
            writer: QuestionWriter {
                user_id: entity.writer_id,
                nickname: entity.writer_nickname,
                image_url: entity.writer_image_url,
            },
            content: entity.content,
            created_at: entity.created_at,
        }
    }
}
