//! Questions asked on a meeting.

use domain::models::question::{CreateQuestionRequest, QuestionResponse};
use persistence::repositories::{MeetingRepository, QuestionRepository, UserRepository};
use shared::pagination::{Page, PageRequest};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::meeting::MeetingError;

pub struct QuestionService {
    questions: QuestionRepository,
    meetings: MeetingRepository,
    users: UserRepository,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            questions: QuestionRepository::new(pool.clone()),
            meetings: MeetingRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    pub async fn ask(
        &self,
        writer_id: Uuid,
        meeting_id: Uuid,
        request: &CreateQuestionRequest,
    ) -> Result<QuestionResponse, MeetingError> {
        if self.users.find_active_by_id(writer_id).await?.is_none() {
            return Err(MeetingError::UserNotFound);
        }
        if self.meetings.find_by_id(meeting_id).await?.is_none() {
            return Err(MeetingError::NotFound);
        }

        let question = self
            .questions
            .create(meeting_id, writer_id, request.content.trim())
            .await?;
        info!(question_id = %question.id, meeting_id = %meeting_id, "Question created");
        Ok(question.into())
    }

    pub async fn list(
        &self,
        meeting_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<QuestionResponse>, MeetingError> {
        if self.meetings.find_by_id(meeting_id).await?.is_none() {
            return Err(MeetingError::NotFound);
        }

        let rows = self
            .questions
            .find_by_meeting(meeting_id, page.limit(), page.offset())
            .await?;
        let total = self.questions.count_by_meeting(meeting_id).await?;
        let content = rows.into_iter().map(QuestionResponse::from).collect();
        Ok(Page::new(content, page, total))
    }
}
