//! Sign-up and login routes.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_not_blank, validate_password_strength};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::services::auth::{AuthResult, AuthService};

/// Request body for `POST /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(
        length(min = 1, max = 30, message = "Nickname must be 1-30 characters"),
        custom(function = "validate_not_blank")
    )]
    pub nickname: String,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issued access token with the account it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user_id: result.user_id,
            email: result.email,
            nickname: result.nickname,
            access_token: result.access_token,
            token_type: "Bearer",
            expires_in: result.access_token_expires_in,
        }
    }
}

/// Register a new user.
///
/// POST /users
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let result = service
        .register(
            &request.email,
            &request.password,
            &request.nickname,
            request.image_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Log in with email and password.
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let result = service.login(&request.email, &request.password).await?;
    Ok(Json(result.into()))
}
