//! Meeting entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use domain::models::meeting::{
    Address, Category, DatePolicy, DateTimeInfo, HostInfo, Meeting, MeetingDetailResponse,
    MeetingResponse, MeetingState,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for meeting_category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "meeting_category", rename_all = "lowercase")]
pub enum CategoryDb {
    Mentoring,
    Social,
    Study,
    Hobby,
    Etc,
}

impl From<CategoryDb> for Category {
    fn from(db: CategoryDb) -> Self {
        match db {
            CategoryDb::Mentoring => Category::Mentoring,
            CategoryDb::Social => Category::Social,
            CategoryDb::Study => Category::Study,
            CategoryDb::Hobby => Category::Hobby,
            CategoryDb::Etc => Category::Etc,
        }
    }
}

impl From<Category> for CategoryDb {
    fn from(category: Category) -> Self {
        match category {
            Category::Mentoring => CategoryDb::Mentoring,
            Category::Social => CategoryDb::Social,
            Category::Study => CategoryDb::Study,
            Category::Hobby => CategoryDb::Hobby,
            Category::Etc => CategoryDb::Etc,
        }
    }
}

/// Database enum for meeting_state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "meeting_state", rename_all = "lowercase")]
pub enum MeetingStateDb {
    Open,
    Close,
}

impl From<MeetingStateDb> for MeetingState {
    fn from(db: MeetingStateDb) -> Self {
        match db {
            MeetingStateDb::Open => MeetingState::Open,
            MeetingStateDb::Close => MeetingState::Close,
        }
    }
}

impl From<MeetingState> for MeetingStateDb {
    fn from(state: MeetingState) -> Self {
        match state {
            MeetingState::Open => MeetingStateDb::Open,
            MeetingState::Close => MeetingStateDb::Close,
        }
    }
}

/// Database enum for date_policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "date_policy", rename_all = "snake_case")]
pub enum DatePolicyDb {
    Free,
    OneDay,
    Period,
}

impl From<DatePolicyDb> for DatePolicy {
    fn from(db: DatePolicyDb) -> Self {
        match db {
            DatePolicyDb::Free => DatePolicy::Free,
            DatePolicyDb::OneDay => DatePolicy::OneDay,
            DatePolicyDb::Period => DatePolicy::Period,
        }
    }
}

impl From<DatePolicy> for DatePolicyDb {
    fn from(policy: DatePolicy) -> Self {
        match policy {
            DatePolicy::Free => DatePolicyDb::Free,
            DatePolicy::OneDay => DatePolicyDb::OneDay,
            DatePolicy::Period => DatePolicyDb::Period,
        }
    }
}

/// Database row mapping for the meetings table joined with its host.
#[derive(Debug, Clone, FromRow)]
pub struct MeetingEntity {
    pub id: Uuid,
    pub host_id: Uuid,
    pub host_nickname: String,
    pub host_image_url: Option<String>,
    pub category: CategoryDb,
    pub title: String,
    pub content: String,
    pub address_ids: Vec<i64>,
    pub address_info: String,
    pub notice: Option<String>,
    pub meeting_state: MeetingStateDb,
    pub price: i64,
    pub personnel: i32,
    pub date_policy: DatePolicyDb,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_time: i32,
    pub date_times: Vec<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingEntity {
    pub fn host_info(&self) -> HostInfo {
        HostInfo {
            user_id: self.host_id,
            nickname: self.host_nickname.clone(),
            image_url: self.host_image_url.clone(),
        }
    }
}

impl From<MeetingEntity> for Meeting {
    fn from(entity: MeetingEntity) -> Self {
        Self {
            id: entity.id,
            host_id: entity.host_id,
            category: entity.category.into(),
            title: entity.title,
            content: entity.content,
            address: Address {
                address_ids: entity.address_ids,
                address_info: entity.address_info,
            },
            notice: entity.notice,
            meeting_state: entity.meeting_state.into(),
            price: entity.price,
            personnel: entity.personnel,
            date_time_info: DateTimeInfo {
                date_policy: entity.date_policy.into(),
                start_date: entity.start_date,
                end_date: entity.end_date,
                start_time: entity.start_time,
                end_time: entity.end_time,
                max_time: entity.max_time,
                date_times: entity.date_times,
            },
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<MeetingEntity> for MeetingResponse {
    fn from(entity: MeetingEntity) -> Self {
        let host = entity.host_info();
        let state: MeetingState = entity.meeting_state.into();
        Self {
            meeting_id: entity.id,
            category: entity.category.into(),
            host,
            title: entity.title,
            content: entity.content,
            address: Address {
                address_ids: entity.address_ids,
                address_info: entity.address_info,
            },
            meeting_state: state,
            is_open: state == MeetingState::Open,
            date_policy: entity.date_policy.into(),
            price: entity.price,
            notice: entity.notice,
        }
    }
}

impl From<MeetingEntity> for MeetingDetailResponse {
    fn from(entity: MeetingEntity) -> Self {
        let host = entity.host_info();
        let meeting: Meeting = entity.into();
        Self {
            meeting: MeetingResponse {
                meeting_id: meeting.id,
                category: meeting.category,
                host,
                title: meeting.title,
                content: meeting.content,
                address: meeting.address,
                meeting_state: meeting.meeting_state,
                is_open: meeting.meeting_state == MeetingState::Open,
                date_policy: meeting.date_time_info.date_policy,
                price: meeting.price,
                notice: meeting.notice,
            },
            personnel: meeting.personnel,
            date_time_info: meeting.date_time_info,
            created_at: meeting.created_at,
        }
    }
}
