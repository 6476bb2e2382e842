//! Payment gateway abstraction.
//!
//! The reservation flow only needs two calls from a card gateway: confirm an
//! authorised payment and cancel (refund) a confirmed one.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Gateway answer to a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub payment_key: String,
    pub order_id: Uuid,
    pub amount: i64,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Errors returned by a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered and refused the operation.
    #[error("Payment gateway refused the request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The gateway could not be reached or answered garbage.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Payment gateway trait.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Confirm a payment the customer authorised in the checkout widget.
    async fn confirm(
        &self,
        payment_key: &str,
        order_id: Uuid,
        amount: i64,
    ) -> Result<PaymentConfirmation, GatewayError>;

    /// Cancel a confirmed payment in full.
    async fn cancel(&self, payment_key: &str, reason: &str) -> Result<(), GatewayError>;
}
