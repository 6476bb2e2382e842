//! Meeting repository for database operations.

use chrono::NaiveDate;
use domain::models::meeting::{Category, CreateMeetingRequest};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{CategoryDb, DatePolicyDb, MeetingEntity};
use crate::metrics::QueryTimer;

/// Meeting columns joined with the host's public profile.
const MEETING_SELECT: &str = r#"
    SELECT m.id, m.host_id, u.nickname AS host_nickname, u.image_url AS host_image_url,
           m.category, m.title, m.content, m.address_ids, m.address_info, m.notice,
           m.meeting_state, m.price, m.personnel, m.date_policy, m.start_date, m.end_date,
           m.start_time, m.end_time, m.max_time, m.date_times, m.created_at, m.updated_at
    FROM meetings m
    JOIN users u ON u.id = m.host_id
"#;

/// Filters for the public meeting search.
#[derive(Debug, Clone, Default)]
pub struct MeetingSearch<'a> {
    pub keyword: Option<&'a str>,
    pub category: Option<Category>,
}

impl MeetingSearch<'_> {
    fn pattern(&self) -> Option<String> {
        self.keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern)
    }

    fn category(&self) -> Option<CategoryDb> {
        self.category.map(CategoryDb::from)
    }
}

/// Builds an `ILIKE` pattern matching `keyword` anywhere, escaping wildcards.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Repository for meeting-related database operations.
#[derive(Clone)]
pub struct MeetingRepository {
    pool: PgPool,
}

impl MeetingRepository {
    /// Creates a new MeetingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new open meeting and return its id.
    pub async fn create(
        &self,
        host_id: Uuid,
        request: &CreateMeetingRequest,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_meeting");
        let info = &request.date_time_info;
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO meetings (
                host_id, category, title, content, address_ids, address_info, notice,
                price, personnel, date_policy, start_date, end_date, start_time, end_time,
                max_time, date_times
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(host_id)
        .bind(CategoryDb::from(request.category))
        .bind(request.title.trim())
        .bind(&request.content)
        .bind(&request.address.address_ids)
        .bind(&request.address.address_info)
        .bind(&request.notice)
        .bind(request.price)
        .bind(request.personnel)
        .bind(DatePolicyDb::from(info.date_policy))
        .bind(info.start_date)
        .bind(info.end_date)
        .bind(info.start_time)
        .bind(info.end_time)
        .bind(info.max_time)
        .bind(&info.date_times)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a meeting by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MeetingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meeting_by_id");
        let sql = format!("{} WHERE m.id = $1", MEETING_SELECT);
        let result = sqlx::query_as::<_, MeetingEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Load a meeting and lock its row until the surrounding transaction ends.
    ///
    /// Every reservation on the meeting goes through this lock, so capacity
    /// checks never race each other.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<MeetingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_meeting_by_id");
        let sql = format!("{} WHERE m.id = $1 FOR UPDATE OF m", MEETING_SELECT);
        let result = sqlx::query_as::<_, MeetingEntity>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await;
        timer.record();
        result
    }

    /// Search meetings, newest first.
    pub async fn search(
        &self,
        filter: &MeetingSearch<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MeetingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_meetings");
        let sql = format!(
            r#"{}
            WHERE ($1::text IS NULL OR m.title ILIKE $1 OR m.content ILIKE $1)
              AND ($2::meeting_category IS NULL OR m.category = $2)
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $3 OFFSET $4
            "#,
            MEETING_SELECT
        );
        let result = sqlx::query_as::<_, MeetingEntity>(&sql)
            .bind(filter.pattern())
            .bind(filter.category())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count meetings matching a search.
    pub async fn count_search(&self, filter: &MeetingSearch<'_>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_search_meetings");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM meetings m
            WHERE ($1::text IS NULL OR m.title ILIKE $1 OR m.content ILIKE $1)
              AND ($2::meeting_category IS NULL OR m.category = $2)
            "#,
        )
        .bind(filter.pattern())
        .bind(filter.category())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Meetings hosted by a user, newest first.
    pub async fn find_by_host(
        &self,
        host_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MeetingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meetings_by_host");
        let sql = format!(
            "{} WHERE m.host_id = $1 ORDER BY m.created_at DESC, m.id DESC LIMIT $2 OFFSET $3",
            MEETING_SELECT
        );
        let result = sqlx::query_as::<_, MeetingEntity>(&sql)
            .bind(host_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Count the meetings a user hosts.
    pub async fn count_by_host(&self, host_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_meetings_by_host");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meetings WHERE host_id = $1")
                .bind(host_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Meetings by ID, in no particular order.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<MeetingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_meetings_by_ids");
        let sql = format!("{} WHERE m.id = ANY($1)", MEETING_SELECT);
        let result = sqlx::query_as::<_, MeetingEntity>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Close an open meeting. Returns false when it was already closed.
    pub async fn close(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("close_meeting");
        let result = sqlx::query(
            r#"
            UPDATE meetings
            SET meeting_state = 'close', updated_at = NOW()
            WHERE id = $1 AND meeting_state = 'open'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Close every open meeting whose date window ended before `today`.
    pub async fn close_expired(&self, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("close_expired_meetings");
        let result = sqlx::query(
            r#"
            UPDATE meetings
            SET meeting_state = 'close', updated_at = NOW()
            WHERE meeting_state = 'open' AND end_date < $1
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let filter = MeetingSearch {
            keyword: Some("   "),
            category: None,
        };
        assert!(filter.pattern().is_none());

        let filter = MeetingSearch {
            keyword: Some(" async "),
            category: Some(Category::Study),
        };
        assert_eq!(filter.pattern().as_deref(), Some("%async%"));
        assert_eq!(filter.category(), Some(CategoryDb::Study));
    }
}
