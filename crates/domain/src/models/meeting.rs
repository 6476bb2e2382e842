//! Meeting domain models.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_on_the_hour};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::reservation::ReservationState;

/// Meeting category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Mentoring,
    Social,
    Study,
    Hobby,
    Etc,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mentoring => "MENTORING",
            Category::Social => "SOCIAL",
            Category::Study => "STUDY",
            Category::Hobby => "HOBBY",
            Category::Etc => "ETC",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MENTORING" => Ok(Category::Mentoring),
            "SOCIAL" => Ok(Category::Social),
            "STUDY" => Ok(Category::Study),
            "HOBBY" => Ok(Category::Hobby),
            "ETC" => Ok(Category::Etc),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a meeting still accepts reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingState {
    Open,
    Close,
}

impl fmt::Display for MeetingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingState::Open => write!(f, "OPEN"),
            MeetingState::Close => write!(f, "CLOSE"),
        }
    }
}

/// How a meeting offers its time.
///
/// - `Free`: any whole-hour range inside the daily window on any date of the
///   period, billed per hour.
/// - `OneDay`: fixed sessions on a single date, billed per session.
/// - `Period`: fixed sessions spread over several dates, billed per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatePolicy {
    Free,
    OneDay,
    Period,
}

impl DatePolicy {
    /// Slot-based policies offer explicit session starts in `date_times`.
    pub fn is_slot_based(&self) -> bool {
        !matches!(self, DatePolicy::Free)
    }
}

impl fmt::Display for DatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatePolicy::Free => write!(f, "FREE"),
            DatePolicy::OneDay => write!(f, "ONE_DAY"),
            DatePolicy::Period => write!(f, "PERIOD"),
        }
    }
}

/// Date/time policy of a meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_date_time_info"))]
pub struct DateTimeInfo {
    pub date_policy: DatePolicy,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(custom(function = "validate_on_the_hour"))]
    pub start_time: NaiveTime,
    #[validate(custom(function = "validate_on_the_hour"))]
    pub end_time: NaiveTime,
    /// Maximum hours per reservation (`Free`) or session length (slot policies).
    #[validate(range(min = 1, max = 24, message = "maxTime must be between 1 and 24 hours"))]
    pub max_time: i32,
    #[serde(default)]
    pub date_times: Vec<NaiveDateTime>,
}

impl DateTimeInfo {
    /// Length of one session for slot-based policies.
    pub fn session_length(&self) -> Duration {
        Duration::hours(i64::from(self.max_time))
    }

    /// The meeting's date window has fully elapsed.
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }
}

fn validate_date_time_info(info: &DateTimeInfo) -> Result<(), ValidationError> {
    let fail = |code: &'static str, message: &'static str| {
        let mut err = ValidationError::new(code);
        err.message = Some(message.into());
        Err(err)
    };

    if info.start_date > info.end_date {
        return fail("date_range", "startDate must not be after endDate");
    }
    if info.start_time >= info.end_time {
        return fail("time_range", "startTime must be before endTime");
    }
    if info.date_policy == DatePolicy::OneDay && info.start_date != info.end_date {
        return fail("one_day", "ONE_DAY meetings must start and end on the same date");
    }
    if info.date_policy.is_slot_based() {
        if info.date_times.is_empty() {
            return fail("date_times", "dateTimes is required for ONE_DAY and PERIOD meetings");
        }
        let out_of_range = info
            .date_times
            .iter()
            .any(|dt| dt.date() < info.start_date || dt.date() > info.end_date);
        if out_of_range {
            return fail("date_times", "dateTimes must fall between startDate and endDate");
        }
    }
    Ok(())
}

/// Meeting location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, message = "At least one region is required"))]
    pub address_ids: Vec<i64>,
    #[validate(length(max = 200, message = "addressInfo must be at most 200 characters"))]
    #[serde(default)]
    pub address_info: String,
}

/// A meeting as seen by business rules.
#[derive(Debug, Clone)]
pub struct Meeting {
    pub id: Uuid,
    pub host_id: Uuid,
    pub category: Category,
    pub title: String,
    pub content: String,
    pub address: Address,
    pub notice: Option<String>,
    pub meeting_state: MeetingState,
    pub price: i64,
    pub personnel: i32,
    pub date_time_info: DateTimeInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    pub fn is_open(&self) -> bool {
        self.meeting_state == MeetingState::Open
    }

    pub fn is_hosted_by(&self, user_id: Uuid) -> bool {
        self.host_id == user_id
    }
}

/// Request body for creating a meeting.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub category: Category,

    #[validate(
        length(max = 100, message = "Title must be at most 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,

    #[validate(nested)]
    pub address: Address,

    #[validate(length(max = 1000, message = "Notice must be at most 1000 characters"))]
    pub notice: Option<String>,

    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,

    #[validate(range(min = 1, max = 100, message = "Personnel must be between 1 and 100"))]
    pub personnel: i32,

    #[validate(nested)]
    pub date_time_info: DateTimeInfo,
}

/// Query parameters for `GET /meetings`.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingSearchQuery {
    pub keyword: Option<String>,
    pub category: Option<Category>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    shared::pagination::DEFAULT_PAGE_SIZE
}

/// Host summary embedded in meeting responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub user_id: Uuid,
    pub nickname: String,
    pub image_url: Option<String>,
}

/// Meeting list item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub meeting_id: Uuid,
    pub category: Category,
    pub host: HostInfo,
    pub title: String,
    pub content: String,
    pub address: Address,
    pub meeting_state: MeetingState,
    pub is_open: bool,
    pub date_policy: DatePolicy,
    pub price: i64,
    pub notice: Option<String>,
}

/// Full meeting view for `GET /meetings/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetailResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub personnel: i32,
    pub date_time_info: DateTimeInfo,
    pub created_at: DateTime<Utc>,
}

/// Reserved date and time range as shown on the my-page views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedTime {
    pub date: NaiveDate,
    /// `HH:MM~HH:MM`
    pub time: String,
}

impl ReservedTime {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            date,
            time: format!("{}~{}", start.format("%H:%M"), end.format("%H:%M")),
        }
    }
}

/// Paid application waiting for the host's decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub image_url: Option<String>,
    pub reservation_state: ReservationState,
    pub date_time_info: ReservedTime,
    pub message: Option<String>,
}

/// Application the host accepted; exposes the applicant's email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfirmed {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub image_url: Option<String>,
    pub reservation_state: ReservationState,
    pub email: String,
    pub date_time_info: ReservedTime,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Applications {
    pub requests: Vec<ApplicationRequest>,
    pub confirmed: Vec<ApplicationConfirmed>,
}

/// Meeting with its applications, for `GET /mypage/meetings/hosts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingHostResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub applications: Applications,
}

/// The caller's own reservation on a meeting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReservation {
    pub reservation_id: Uuid,
    pub reservation_state: ReservationState,
    pub date_time_info: ReservedTime,
    pub amount: i64,
}

/// Meeting the caller reserved, for `GET /mypage/meetings/participants`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingParticipantResponse {
    #[serde(flatten)]
    pub meeting: MeetingResponse,
    pub reservation: ParticipantReservation,
}

/// Response after creating a meeting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingResponse {
    pub meeting_id: Uuid,
}
