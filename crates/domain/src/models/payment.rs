//! Payment domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::reservation::ReservationState;

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayType {
    Card,
    Transfer,
    VirtualAccount,
    Mobile,
}

impl fmt::Display for PayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayType::Card => write!(f, "CARD"),
            PayType::Transfer => write!(f, "TRANSFER"),
            PayType::VirtualAccount => write!(f, "VIRTUAL_ACCOUNT"),
            PayType::Mobile => write!(f, "MOBILE"),
        }
    }
}

/// Payment progress as recorded on our side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayState {
    Before,
    Success,
    Fail,
    Canceled,
}

impl fmt::Display for PayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayState::Before => write!(f, "BEFORE"),
            PayState::Success => write!(f, "SUCCESS"),
            PayState::Fail => write!(f, "FAIL"),
            PayState::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Checkout descriptor returned when a reservation is created.
///
/// The client hands these fields to the payment widget; the gateway then
/// redirects to `success_url` or `fail_url`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub pay_type: PayType,
    pub amount: i64,
    pub order_id: Uuid,
    pub order_name: String,
    pub customer_email: String,
    pub customer_name: String,
    pub success_url: String,
    pub fail_url: String,
    pub create_date: String,
    pub pay_success_yn: PayState,
}

/// Query string of the gateway's success redirect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessQuery {
    pub payment_key: String,
    pub order_id: Uuid,
    pub amount: i64,
}

/// Query string of the gateway's failure redirect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailQuery {
    pub code: Option<String>,
    pub message: Option<String>,
    pub order_id: Uuid,
}

/// Outcome of a payment callback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResultResponse {
    pub order_id: Uuid,
    pub reservation_id: Uuid,
    pub amount: i64,
    pub pay_state: PayState,
    pub reservation_state: ReservationState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_query_deserialize() {
        let order_id = Uuid::new_v4();
        let json = format!(
            r#"{{"paymentKey":"pk_123","orderId":"{}","amount":15000}}"#,
            order_id
        );
        let query: PaymentSuccessQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(query.payment_key, "pk_123");
        assert_eq!(query.order_id, order_id);
        assert_eq!(query.amount, 15000);
    }

    #[test]
    fn test_payment_response_field_names() {
        let response = PaymentResponse {
            pay_type: PayType::Card,
            amount: 1000,
            order_id: Uuid::nil(),
            order_name: "Rust mentoring".to_string(),
            customer_email: "guest@momo.dev".to_string(),
            customer_name: "guest".to_string(),
            success_url: "/payments/success".to_string(),
            fail_url: "/payments/fail".to_string(),
            create_date: "2026-11-05".to_string(),
            pay_success_yn: PayState::Before,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["payType"], "CARD");
        assert_eq!(json["paySuccessYn"], "BEFORE");
        assert_eq!(json["customerEmail"], "guest@momo.dev");
        assert!(json.get("orderId").is_some());
    }
}
