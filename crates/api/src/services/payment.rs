//! Payment gateway clients.
//!
//! [`TossPaymentsClient`] talks to the Toss Payments REST API.
//! [`ConsolePaymentGateway`] approves everything and only logs, for local
//! development and tests.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use domain::services::{GatewayError, PaymentConfirmation, PaymentGateway};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;

/// Builds the gateway selected by `payment.provider`.
pub fn build_gateway(config: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    match config.provider.as_str() {
        "toss" => Ok(Arc::new(TossPaymentsClient::new(config)?)),
        _ => Ok(Arc::new(ConsolePaymentGateway::new())),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    payment_key: &'a str,
    order_id: Uuid,
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResponse {
    payment_key: String,
    order_id: Uuid,
    total_amount: i64,
    approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest<'a> {
    cancel_reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct TossErrorBody {
    code: String,
    message: String,
}

/// Toss Payments API client.
pub struct TossPaymentsClient {
    client: Client,
    base_url: String,
    authorization: String,
    timeout_ms: u64,
}

impl TossPaymentsClient {
    /// Create a new client. Authentication is HTTP Basic with the secret key
    /// as user name and an empty password.
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            authorization: basic_auth(&config.secret_key),
            timeout_ms: config.timeout_ms,
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling payment gateway");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Unavailable(format!("Request timeout after {}ms", self.timeout_ms))
                } else {
                    GatewayError::Unavailable(e.to_string())
                }
            })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<TossErrorBody>(&body) {
            Ok(err) => GatewayError::Rejected {
                code: err.code,
                message: err.message,
            },
            Err(_) => GatewayError::Unavailable(format!("HTTP {}: {}", status, body)),
        })
    }
}

fn basic_auth(secret_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", secret_key)))
}

#[async_trait]
impl PaymentGateway for TossPaymentsClient {
    async fn confirm(
        &self,
        payment_key: &str,
        order_id: Uuid,
        amount: i64,
    ) -> Result<PaymentConfirmation, GatewayError> {
        let response = self
            .post(
                "/v1/payments/confirm",
                &ConfirmRequest {
                    payment_key,
                    order_id,
                    amount,
                },
            )
            .await?;

        let body: ConfirmResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("Invalid gateway response: {}", e)))?;

        if body.order_id != order_id || body.total_amount != amount {
            warn!(
                order_id = %order_id,
                gateway_order_id = %body.order_id,
                gateway_amount = body.total_amount,
                "Gateway confirmation does not match the order"
            );
            return Err(GatewayError::Rejected {
                code: "CONFIRMATION_MISMATCH".to_string(),
                message: "Gateway confirmed a different order or amount".to_string(),
            });
        }

        Ok(PaymentConfirmation {
            payment_key: body.payment_key,
            order_id: body.order_id,
            amount: body.total_amount,
            approved_at: body.approved_at,
        })
    }

    async fn cancel(&self, payment_key: &str, reason: &str) -> Result<(), GatewayError> {
        self.post(
            &format!("/v1/payments/{}/cancel", payment_key),
            &CancelRequest {
                cancel_reason: reason,
            },
        )
        .await?;
        Ok(())
    }
}

/// Gateway that approves every request and logs it.
///
/// `failing()` builds one that rejects everything, for exercising error paths.
#[derive(Debug, Default)]
pub struct ConsolePaymentGateway {
    fail: AtomicBool,
}

impl ConsolePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                code: "CONSOLE_REJECTED".to_string(),
                message: "Console gateway is set to fail".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for ConsolePaymentGateway {
    async fn confirm(
        &self,
        payment_key: &str,
        order_id: Uuid,
        amount: i64,
    ) -> Result<PaymentConfirmation, GatewayError> {
        self.check()?;
        info!(payment_key, order_id = %order_id, amount, "[console gateway] Payment confirmed");
        Ok(PaymentConfirmation {
            payment_key: payment_key.to_string(),
            order_id,
            amount,
            approved_at: Some(Utc::now()),
        })
    }

    async fn cancel(&self, payment_key: &str, reason: &str) -> Result<(), GatewayError> {
        self.check()?;
        info!(payment_key, reason, "[console gateway] Payment cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> PaymentConfig {
        PaymentConfig {
            provider: provider.to_string(),
            secret_key: "test_sk_zXLkKEypNArWmo50nX3lmeaxYG5R".to_string(),
            api_base_url: "https://api.tosspayments.com/".to_string(),
            success_url: "http://localhost/payments/success".to_string(),
            fail_url: "http://localhost/payments/fail".to_string(),
            timeout_ms: 1000,
        }
    }

    #[test]
    fn test_basic_auth_header() {
        // base64("sk:") == "c2s6"
        assert_eq!(basic_auth("sk"), "Basic c2s6");
    }

    #[test]
    fn test_toss_client_trims_base_url() {
        let client = TossPaymentsClient::new(&config("toss")).unwrap();
        assert_eq!(client.base_url, "https://api.tosspayments.com");
    }

    #[test]
    fn test_confirm_request_is_camel_case() {
        let order_id = Uuid::new_v4();
        let json = serde_json::to_value(ConfirmRequest {
            payment_key: "pk",
            order_id,
            amount: 15000,
        })
        .unwrap();
        assert_eq!(json["paymentKey"], "pk");
        assert_eq!(json["orderId"], order_id.to_string());
        assert_eq!(json["amount"], 15000);
    }

    #[test]
    fn test_confirm_response_parses_offset_timestamp() {
        let order_id = Uuid::new_v4();
        let body = format!(
            r#"{{"paymentKey":"pk","orderId":"{}","totalAmount":15000,
                "approvedAt":"2026-11-02T10:00:00+09:00","status":"DONE"}}"#,
            order_id
        );
        let parsed: ConfirmResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.total_amount, 15000);
        assert_eq!(
            parsed.approved_at.unwrap().to_rfc3339(),
            "2026-11-02T01:00:00+00:00"
        );
    }

    #[tokio::test]
    async fn test_console_gateway_approves() {
        let gateway = ConsolePaymentGateway::new();
        let order_id = Uuid::new_v4();
        let confirmation = gateway.confirm("pk_1", order_id, 20000).await.unwrap();
        assert_eq!(confirmation.order_id, order_id);
        assert_eq!(confirmation.amount, 20000);
        assert!(gateway.cancel("pk_1", "test").await.is_ok());
    }

    #[tokio::test]
    async fn test_console_gateway_failing_mode() {
        let gateway = ConsolePaymentGateway::failing();
        let result = gateway.confirm("pk_1", Uuid::new_v4(), 1000).await;
        assert!(matches!(result, Err(GatewayError::Rejected { .. })));
        tokio_test::assert_err!(gateway.cancel("pk_1", "retry").await);

        gateway.set_failing(false);
        tokio_test::assert_ok!(gateway.cancel("pk_1", "retry").await);
    }

    #[test]
    fn test_build_gateway_defaults_to_console() {
        assert!(build_gateway(&config("console")).is_ok());
        assert!(build_gateway(&config("toss")).is_ok());
    }
}
