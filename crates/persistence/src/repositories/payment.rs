//! Payment repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::{NewPayment, PayTypeDb, PaymentEntity};
use crate::metrics::QueryTimer;

const PAYMENT_COLUMNS: &str = r#"
    id, reservation_id, order_id, order_name, amount, pay_type, pay_state, customer_email,
    customer_name, success_url, fail_url, payment_key, fail_reason, approved_at, created_at,
    updated_at
"#;

/// Repository for payment-related database operations.
///
/// Payments only change together with their reservation, so every method
/// runs on the caller's transaction.
pub struct PaymentRepository;

impl PaymentRepository {
    /// Insert a payment in the `before` state.
    pub async fn insert(
        conn: &mut PgConnection,
        payment: &NewPayment<'_>,
    ) -> Result<PaymentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_payment");
        let sql = format!(
            r#"
            INSERT INTO payments (reservation_id, order_name, amount, pay_type, customer_email,
                                  customer_name, success_url, fail_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(payment.reservation_id)
            .bind(payment.order_name)
            .bind(payment.amount)
            .bind(PayTypeDb::from(payment.pay_type))
            .bind(payment.customer_email)
            .bind(payment.customer_name)
            .bind(payment.success_url)
            .bind(payment.fail_url)
            .fetch_one(conn)
            .await;
        timer.record();
        result
    }

    /// Load a payment by gateway order id and lock its row.
    pub async fn lock_by_order_id(
        conn: &mut PgConnection,
        order_id: Uuid,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_payment_by_order_id");
        let sql = format!(
            "SELECT {} FROM payments WHERE order_id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        );
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(order_id)
            .fetch_optional(conn)
            .await;
        timer.record();
        result
    }

    /// Load the payment of a reservation and lock its row.
    pub async fn lock_by_reservation_id(
        conn: &mut PgConnection,
        reservation_id: Uuid,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_payment_by_reservation_id");
        let sql = format!(
            "SELECT {} FROM payments WHERE reservation_id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        );
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(reservation_id)
            .fetch_optional(conn)
            .await;
        timer.record();
        result
    }

    /// Record a confirmed payment.
    pub async fn mark_success(
        conn: &mut PgConnection,
        id: Uuid,
        payment_key: &str,
        approved_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_payment_success");
        sqlx::query(
            r#"
            UPDATE payments
            SET pay_state = 'success', payment_key = $2, approved_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payment_key)
        .bind(approved_at)
        .execute(conn)
        .await?;
        timer.record();
        Ok(())
    }

    /// Record a failed payment.
    pub async fn mark_fail(
        conn: &mut PgConnection,
        id: Uuid,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_payment_fail");
        sqlx::query(
            r#"
            UPDATE payments
            SET pay_state = 'fail', fail_reason = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(conn)
        .await?;
        timer.record();
        Ok(())
    }

    /// Record a cancelled (refunded or never paid) payment.
    pub async fn mark_canceled(conn: &mut PgConnection, id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("mark_payment_canceled");
        sqlx::query(
            r#"
            UPDATE payments
            SET pay_state = 'canceled', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(conn)
        .await?;
        timer.record();
        Ok(())
    }
}
