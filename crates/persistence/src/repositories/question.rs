//! Question repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::QuestionEntity;
use crate::metrics::QueryTimer;

/// Repository for meeting questions.
#[derive(Clone)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    /// Creates a new QuestionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a question and return it with its writer.
    pub async fn create(
        &self,
        meeting_id: Uuid,
        writer_id: Uuid,
        content: &str,
    ) -> Result<QuestionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_question");
        let result = sqlx::query_as::<_, QuestionEntity>(
            r#"
            WITH q AS (
                INSERT INTO questions (meeting_id, writer_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, meeting_id, writer_id, content, created_at
            )
            SELECT q.id, q.meeting_id, q.writer_id, u.nickname AS writer_nickname,
                   u.image_url AS writer_image_url, q.content, q.created_at
            FROM q
            JOIN users u ON u.id = q.writer_id
            "#,
        )
        .bind(meeting_id)
        .bind(writer_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Questions on a meeting, newest first.
    pub async fn find_by_meeting(
        &self,
        meeting_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuestionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_questions_by_meeting");
        let result = sqlx::query_as::<_, QuestionEntity>(
            r#"
            SELECT q.id, q.meeting_id, q.writer_id, u.nickname AS writer_nickname,
                   u.image_url AS writer_image_url, q.content, q.created_at
            FROM questions q
            JOIN users u ON u.id = q.writer_id
            WHERE q.meeting_id = $1
            ORDER BY q.created_at DESC, q.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(meeting_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count questions on a meeting.
    pub async fn count_by_meeting(&self, meeting_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_questions_by_meeting");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE meeting_id = $1")
                .bind(meeting_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }
}
