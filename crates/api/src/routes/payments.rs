//! Payment gateway redirect targets.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::payment::{PaymentFailQuery, PaymentResultResponse, PaymentSuccessQuery};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::ReservationService;

/// GET /payments/success?paymentKey&orderId&amount
pub async fn payment_success(
    State(state): State<AppState>,
    Query(query): Query<PaymentSuccessQuery>,
) -> Result<Json<PaymentResultResponse>, ApiError> {
    let result = ReservationService::new(
        state.pool.clone(),
        state.gateway.clone(),
        &state.config.payment,
    )
    .confirm_payment(&query)
    .await?;
    Ok(Json(result))
}

/// GET /payments/fail?code&message&orderId
pub async fn payment_fail(
    State(state): State<AppState>,
    Query(query): Query<PaymentFailQuery>,
) -> Result<Json<PaymentResultResponse>, ApiError> {
    let result = ReservationService::new(
        state.pool.clone(),
        state.gateway.clone(),
        &state.config.payment,
    )
    .fail_payment(&query)
    .await?;
    Ok(Json(result))
}
