//! Host settlement history.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::settlement::SettlementResponse;
use shared::pagination::{Page, PageRequest};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::SettlementService;

/// GET /mypage/settlements?page&size
pub async fn list_settlements(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<SettlementResponse>>, ApiError> {
    let settlements = SettlementService::new(state.pool.clone())
        .list_for_host(auth.user_id, &page)
        .await?;
    Ok(Json(settlements))
}
