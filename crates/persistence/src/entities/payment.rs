//! Payment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::payment::{PayState, PayType, PaymentResponse};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for pay_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pay_type", rename_all = "snake_case")]
pub enum PayTypeDb {
    Card,
    Transfer,
    VirtualAccount,
    Mobile,
}

impl From<PayTypeDb> for PayType {
    fn from(db: PayTypeDb) -> Self {
        match db {
            PayTypeDb::Card => PayType::Card,
            PayTypeDb::Transfer => PayType::Transfer,
            PayTypeDb::VirtualAccount => PayType::VirtualAccount,
            PayTypeDb::Mobile => PayType::Mobile,
        }
    }
}

impl From<PayType> for PayTypeDb {
    fn from(pay_type: PayType) -> Self {
        match pay_type {
            PayType::Card => PayTypeDb::Card,
            PayType::Transfer => PayTypeDb::Transfer,
            PayType::VirtualAccount => PayTypeDb::VirtualAccount,
            PayType::Mobile => PayTypeDb::Mobile,
        }
    }
}

/// Database enum for pay_state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "pay_state", rename_all = "lowercase")]
pub enum PayStateDb {
    Before,
    Success,
    Fail,
    Canceled,
}

impl From<PayStateDb> for PayState {
    fn from(db: PayStateDb) -> Self {
        match db {
            PayStateDb::Before => PayState::Before,
            PayStateDb::Success => PayState::Success,
            PayStateDb::Fail => PayState::Fail,
            PayStateDb::Canceled => PayState::Canceled,
        }
    }
}

impl From<PayState> for PayStateDb {
    fn from(state: PayState) -> Self {
        match state {
            PayState::Before => PayStateDb::Before,
            PayState::Success => PayStateDb::Success,
            PayState::Fail => PayStateDb::Fail,
            PayState::Canceled => PayStateDb::Canceled,
        }
    }
}

/// Database row mapping for the payments table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub order_id: Uuid,
    pub order_name: String,
    pub amount: i64,
    pub pay_type: PayTypeDb,
    pub pay_state: PayStateDb,
    pub customer_email: String,
    pub customer_name: String,
    pub success_url: String,
    pub fail_url: String,
    pub payment_key: Option<String>,
    pub fail_reason: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentResponse {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            pay_type: entity.pay_type.into(),
            amount: entity.amount,
            order_id: entity.order_id,
            order_name: entity.order_name,
            customer_email: entity.customer_email,
            customer_name: entity.customer_name,
            success_url: entity.success_url,
            fail_url: entity.fail_url,
            create_date: entity.created_at.date_naive().to_string(),
            pay_success_yn: entity.pay_state.into(),
        }
    }
}

/// Values for a new payment row.
#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub reservation_id: Uuid,
    pub order_name: &'a str,
    pub amount: i64,
    pub pay_type: PayType,
    pub customer_email: &'a str,
    pub customer_name: &'a str,
    pub success_url: &'a str,
    pub fail_url: &'a str,
}
