//! My-page profile routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::ProfileResponse;
use domain::models::User;
use persistence::repositories::UserRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuthService;

/// GET /mypage/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user: User = UserRepository::new(state.pool.clone())
        .find_active_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    Ok(Json(user.into()))
}

/// Withdraw the caller's account.
///
/// DELETE /mypage/profile
pub async fn withdraw(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<StatusCode, ApiError> {
    AuthService::new(state.pool.clone(), state.jwt.clone())
        .withdraw(auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
