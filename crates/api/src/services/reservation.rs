//! Reservation lifecycle: booking, payment callbacks, host decision and
//! guest cancellation.
//!
//! Every operation runs in one transaction. Booking locks the meeting row so
//! that concurrent requests for the same meeting are admitted one at a time.

use chrono::{Local, Utc};
use domain::models::payment::{
    PayState, PayType, PaymentFailQuery, PaymentResponse, PaymentResultResponse,
    PaymentSuccessQuery,
};
use domain::models::reservation::{ReservationRequest, ReservationSlot, ReservationState};
use domain::models::Meeting;
use domain::services::{
    validate_reservation, GatewayError, PaymentGateway, ReservationAttempt, ReservationRejection,
};
use persistence::entities::{NewPayment, PaymentEntity, ReservationEntity};
use persistence::repositories::{
    MeetingRepository, NewReservation, PaymentRepository, ReservationRepository, UserRepository,
};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::error::ApiError;
use crate::middleware::metrics::{
    record_payment_result, record_reservation_created, record_reservation_rejected,
};

/// Errors raised by reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Meeting not found")]
    MeetingNotFound,

    #[error("Reservation not found")]
    ReservationNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Only the host can decide on reservations")]
    NotHost,

    #[error("Only the reserving user can cancel a reservation")]
    NotReserver,

    #[error("Reservation request is incomplete")]
    IncompleteRequest,

    #[error(transparent)]
    Rejected(#[from] ReservationRejection),

    #[error("Reservation cannot move from {from} to {to}")]
    InvalidTransition {
        from: ReservationState,
        to: ReservationState,
    },

    #[error("Reservation was already settled to the host")]
    AlreadySettled,

    #[error("Payment was already processed")]
    PaymentAlreadyProcessed,

    #[error("Paid reservation has no payment key")]
    MissingPaymentKey,

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::MeetingNotFound
            | ReservationError::ReservationNotFound
            | ReservationError::UserNotFound
            | ReservationError::PaymentNotFound => ApiError::NotFound(err.to_string()),
            ReservationError::NotHost | ReservationError::NotReserver => {
                ApiError::Forbidden(err.to_string())
            }
            ReservationError::IncompleteRequest => ApiError::Validation(err.to_string()),
            ReservationError::Rejected(rejection) => rejection.into(),
            ReservationError::InvalidTransition { .. } => ApiError::Rejected {
                code: "invalid_reservation_state",
                message: err.to_string(),
            },
            ReservationError::AlreadySettled => ApiError::Rejected {
                code: "reservation_settled",
                message: err.to_string(),
            },
            ReservationError::PaymentAlreadyProcessed => ApiError::Conflict(err.to_string()),
            ReservationError::MissingPaymentKey => ApiError::Internal(err.to_string()),
            ReservationError::Gateway(e) => e.into(),
            ReservationError::Database(e) => e.into(),
        }
    }
}

/// Reservation service.
pub struct ReservationService {
    pool: PgPool,
    users: UserRepository,
    meetings: MeetingRepository,
    gateway: Arc<dyn PaymentGateway>,
    success_url: String,
    fail_url: String,
}

impl ReservationService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>, payment: &PaymentConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            meetings: MeetingRepository::new(pool.clone()),
            pool,
            gateway,
            success_url: payment.success_url.clone(),
            fail_url: payment.fail_url.clone(),
        }
    }

    /// Book a slot and open its payment.
    ///
    /// The reservation starts `PENDING` with a `BEFORE` payment; the returned
    /// descriptor is handed to the payment widget.
    pub async fn reserve(
        &self,
        user_id: Uuid,
        meeting_id: Uuid,
        request: &ReservationRequest,
    ) -> Result<PaymentResponse, ReservationError> {
        let slot = request.slot().ok_or(ReservationError::IncompleteRequest)?;
        let amount = request.amount.ok_or(ReservationError::IncompleteRequest)?;

        let user = self
            .users
            .find_active_by_id(user_id)
            .await?
            .ok_or(ReservationError::UserNotFound)?;

        let mut tx = self.pool.begin().await?;

        let meeting: Meeting = MeetingRepository::lock_by_id(&mut *tx, meeting_id)
            .await?
            .ok_or(ReservationError::MeetingNotFound)?
            .into();

        let occupied: Vec<ReservationSlot> =
            ReservationRepository::occupied_slots(&mut *tx, meeting_id, slot.date)
                .await?
                .into_iter()
                .map(ReservationSlot::from)
                .collect();

        let attempt = ReservationAttempt {
            requester: user_id,
            slot: &slot,
            amount,
            occupied: &occupied,
            now: Local::now().naive_local(),
        };
        if let Err(rejection) = validate_reservation(&meeting, attempt) {
            record_reservation_rejected(rejection.code());
            info!(
                meeting_id = %meeting_id,
                user_id = %user_id,
                reason = rejection.code(),
                "Reservation rejected"
            );
            return Err(rejection.into());
        }

        let reservation = ReservationRepository::insert(
            &mut *tx,
            &NewReservation {
                meeting_id,
                user_id,
                slot,
                amount,
                memo: request.reservation_memo.as_deref(),
            },
        )
        .await?;

        let payment = PaymentRepository::insert(
            &mut *tx,
            &NewPayment {
                reservation_id: reservation.id,
                order_name: &meeting.title,
                amount,
                pay_type: PayType::Card,
                customer_email: &user.email,
                customer_name: &user.nickname,
                success_url: &self.success_url,
                fail_url: &self.fail_url,
            },
        )
        .await?;

        tx.commit().await?;

        record_reservation_created();
        info!(
            reservation_id = %reservation.id,
            meeting_id = %meeting_id,
            user_id = %user_id,
            order_id = %payment.order_id,
            amount,
            "Reservation created"
        );

        Ok(payment.into())
    }

    /// Host accepts or rejects a paid reservation. Rejecting refunds it.
    pub async fn decide(
        &self,
        host_id: Uuid,
        meeting_id: Uuid,
        reservation_id: Uuid,
        accepted: bool,
    ) -> Result<ReservationState, ReservationError> {
        let meeting = self
            .meetings
            .find_by_id(meeting_id)
            .await?
            .ok_or(ReservationError::MeetingNotFound)?;
        if meeting.host_id != host_id {
            return Err(ReservationError::NotHost);
        }

        let target = if accepted {
            ReservationState::Accept
        } else {
            ReservationState::Reject
        };

        let mut tx = self.pool.begin().await?;
        let reservation = lock_reservation(&mut *tx, meeting_id, reservation_id).await?;
        let current = ensure_transition(&reservation, target)?;

        ReservationRepository::transition(&mut *tx, reservation.id, current, target).await?;
        if accepted {
            tx.commit().await?;
        } else {
            let payment = lock_payment_of(&mut *tx, reservation.id).await?;
            PaymentRepository::mark_canceled(&mut *tx, payment.id).await?;
            self.refund_and_commit(tx, &payment, "Reservation rejected by host")
                .await?;
        }

        info!(
            reservation_id = %reservation_id,
            meeting_id = %meeting_id,
            state = %target,
            "Reservation decided"
        );
        Ok(target)
    }

    /// Guest cancels their own reservation. A paid one is refunded.
    pub async fn cancel(
        &self,
        user_id: Uuid,
        meeting_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<(), ReservationError> {
        let mut tx = self.pool.begin().await?;
        let reservation = lock_reservation(&mut *tx, meeting_id, reservation_id).await?;
        if reservation.user_id != user_id {
            return Err(ReservationError::NotReserver);
        }
        let current = ensure_transition(&reservation, ReservationState::Cancel)?;

        let payment = lock_payment_of(&mut *tx, reservation.id).await?;
        PaymentRepository::mark_canceled(&mut *tx, payment.id).await?;
        ReservationRepository::transition(
            &mut *tx,
            reservation.id,
            current,
            ReservationState::Cancel,
        )
        .await?;

        if current.is_paid() {
            self.refund_and_commit(tx, &payment, "Reservation cancelled by guest")
                .await?;
        } else {
            tx.commit().await?;
        }

        info!(
            reservation_id = %reservation_id,
            user_id = %user_id,
            refunded = current.is_paid(),
            "Reservation cancelled"
        );
        Ok(())
    }

    /// Gateway success redirect: confirm the payment and mark it paid.
    pub async fn confirm_payment(
        &self,
        query: &PaymentSuccessQuery,
    ) -> Result<PaymentResultResponse, ReservationError> {
        let mut tx = self.pool.begin().await?;

        let payment = PaymentRepository::lock_by_order_id(&mut *tx, query.order_id)
            .await?
            .ok_or(ReservationError::PaymentNotFound)?;
        if PayState::from(payment.pay_state) != PayState::Before {
            return Err(ReservationError::PaymentAlreadyProcessed);
        }
        if payment.amount != query.amount {
            warn!(
                order_id = %payment.order_id,
                expected = payment.amount,
                actual = query.amount,
                "Payment callback amount does not match"
            );
            return Err(ReservationRejection::AmountDoesNotMatch {
                expected: payment.amount,
                actual: query.amount,
            }
            .into());
        }

        let reservation = ReservationRepository::lock_by_id(&mut *tx, payment.reservation_id)
            .await?
            .ok_or(ReservationError::ReservationNotFound)?;
        ensure_transition(&reservation, ReservationState::PaymentSuccess)?;

        let confirmation = match self
            .gateway
            .confirm(&query.payment_key, payment.order_id, payment.amount)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(GatewayError::Rejected { code, message }) => {
                // The gateway refused the charge for good: release the slot.
                let reason = format!("{}: {}", code, message);
                PaymentRepository::mark_fail(&mut *tx, payment.id, &reason).await?;
                ReservationRepository::transition(
                    &mut *tx,
                    reservation.id,
                    ReservationState::Pending,
                    ReservationState::PaymentFail,
                )
                .await?;
                tx.commit().await?;
                record_payment_result("fail");
                warn!(order_id = %payment.order_id, reason = %reason, "Payment confirmation rejected");
                return Err(GatewayError::Rejected { code, message }.into());
            }
            Err(e) => return Err(e.into()),
        };

        PaymentRepository::mark_success(
            &mut *tx,
            payment.id,
            &confirmation.payment_key,
            confirmation.approved_at.unwrap_or_else(Utc::now),
        )
        .await?;
        ReservationRepository::transition(
            &mut *tx,
            reservation.id,
            ReservationState::Pending,
            ReservationState::PaymentSuccess,
        )
        .await?;
        tx.commit().await?;

        record_payment_result("success");
        info!(
            order_id = %payment.order_id,
            reservation_id = %reservation.id,
            amount = payment.amount,
            "Payment confirmed"
        );

        Ok(PaymentResultResponse {
            order_id: payment.order_id,
            reservation_id: reservation.id,
            amount: payment.amount,
            pay_state: PayState::Success,
            reservation_state: ReservationState::PaymentSuccess,
        })
    }

    /// Gateway failure redirect: record the failure and release the slot.
    pub async fn fail_payment(
        &self,
        query: &PaymentFailQuery,
    ) -> Result<PaymentResultResponse, ReservationError> {
        let mut tx = self.pool.begin().await?;

        let payment = PaymentRepository::lock_by_order_id(&mut *tx, query.order_id)
            .await?
            .ok_or(ReservationError::PaymentNotFound)?;
        if PayState::from(payment.pay_state) != PayState::Before {
            return Err(ReservationError::PaymentAlreadyProcessed);
        }

        let reason = format!(
            "{}: {}",
            query.code.as_deref().unwrap_or("UNKNOWN"),
            query.message.as_deref().unwrap_or("payment failed")
        );
        PaymentRepository::mark_fail(&mut *tx, payment.id, &reason).await?;

        let moved = ReservationRepository::transition(
            &mut *tx,
            payment.reservation_id,
            ReservationState::Pending,
            ReservationState::PaymentFail,
        )
        .await?;
        tx.commit().await?;

        record_payment_result("fail");
        info!(order_id = %payment.order_id, reason = %reason, "Payment failed");

        let reservation_state = if moved {
            ReservationState::PaymentFail
        } else {
            // Already released by cancellation or expiry.
            self.current_state(payment.reservation_id).await?
        };

        Ok(PaymentResultResponse {
            order_id: payment.order_id,
            reservation_id: payment.reservation_id,
            amount: payment.amount,
            pay_state: PayState::Fail,
            reservation_state,
        })
    }

    async fn current_state(&self, reservation_id: Uuid) -> Result<ReservationState, ReservationError> {
        let reservation = ReservationRepository::new(self.pool.clone())
            .find_by_id(reservation_id)
            .await?
            .ok_or(ReservationError::ReservationNotFound)?;
        Ok(reservation.state.into())
    }

    /// Refund `payment` and commit the writes already staged in `tx`.
    ///
    /// The gateway is called after every write so that a refused refund rolls
    /// them all back. Only the commit itself can fail after the money moved;
    /// that case is logged with the payment key for reconciliation.
    async fn refund_and_commit(
        &self,
        tx: Transaction<'_, Postgres>,
        payment: &PaymentEntity,
        reason: &str,
    ) -> Result<(), ReservationError> {
        let payment_key = payment
            .payment_key
            .as_deref()
            .ok_or(ReservationError::MissingPaymentKey)?;
        self.gateway.cancel(payment_key, reason).await?;

        if let Err(e) = tx.commit().await {
            error!(
                order_id = %payment.order_id,
                payment_key,
                amount = payment.amount,
                error = %e,
                "Payment refunded but the cancellation was not saved"
            );
            return Err(e.into());
        }

        record_payment_result("canceled");
        info!(order_id = %payment.order_id, amount = payment.amount, "Payment refunded");
        Ok(())
    }
}

/// Lock a reservation, checking it belongs to `meeting_id`.
async fn lock_reservation(
    conn: &mut PgConnection,
    meeting_id: Uuid,
    reservation_id: Uuid,
) -> Result<ReservationEntity, ReservationError> {
    ReservationRepository::lock_by_id(conn, reservation_id)
        .await?
        .filter(|r| r.meeting_id == meeting_id)
        .ok_or(ReservationError::ReservationNotFound)
}

async fn lock_payment_of(
    conn: &mut PgConnection,
    reservation_id: Uuid,
) -> Result<PaymentEntity, ReservationError> {
    PaymentRepository::lock_by_reservation_id(conn, reservation_id)
        .await?
        .ok_or(ReservationError::PaymentNotFound)
}

fn ensure_transition(
    reservation: &ReservationEntity,
    to: ReservationState,
) -> Result<ReservationState, ReservationError> {
    // Paid out to the host: the reservation is final.
    if reservation.settlement_id.is_some() {
        return Err(ReservationError::AlreadySettled);
    }
    let from: ReservationState = reservation.state.into();
    if from.can_transition_to(to) {
        Ok(from)
    } else {
        Err(ReservationError::InvalidTransition { from, to })
    }
}
