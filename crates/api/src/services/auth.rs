//! Authentication service for sign-up, login and withdrawal.

use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        }
    }
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub access_token: String,
    pub access_token_expires_in: i64,
}

/// Builds the RS256 token configuration from the `[jwt]` section.
pub fn jwt_from_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::from_rsa_pem(
        &normalize_pem_key(&config.private_key),
        &normalize_pem_key(&config.public_key),
        config.access_token_expiry_secs,
        config.leeway_secs,
    )
}

/// Normalize a PEM key read from the environment.
///
/// Strips surrounding quotes and turns literal `\n` sequences into newlines.
fn normalize_pem_key(key: &str) -> String {
    let key = key.trim().trim_matches('"').trim_matches('\'');
    let normalized = key.replace("\\n", "\n");

    if !normalized.contains('\n') && normalized.len() > 100 {
        tracing::error!("PEM key has no line breaks after normalization");
    }

    normalized
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    /// Creates a new AuthService with the given database pool and token settings.
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Register a new user with email and password.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        nickname: &str,
        image_url: Option<&str>,
    ) -> Result<AuthResult, AuthError> {
        let email = email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        // A concurrent sign-up can still win the race; the unique index decides.
        let user = match self
            .users
            .create_user(&email, &password_hash, nickname.trim(), image_url)
            .await
        {
            Ok(user) => user,
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "User registered");
        self.issue(user.id, user.email, user.nickname)
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "User logged in");
        self.issue(user.id, user.email, user.nickname)
    }

    /// Withdraw an account. Tokens already issued stop working because
    /// every authenticated service call re-checks that the user is active.
    pub async fn withdraw(&self, user_id: Uuid) -> Result<(), AuthError> {
        if !self.users.deactivate(user_id).await? {
            return Err(AuthError::UserNotFound);
        }
        info!(user_id = %user_id, "User withdrew");
        Ok(())
    }

    fn issue(&self, user_id: Uuid, email: String, nickname: String) -> Result<AuthResult, AuthError> {
        let (access_token, _jti) = self.jwt.generate_access_token(user_id, &email)?;
        Ok(AuthResult {
            user_id,
            email,
            nickname,
            access_token,
            access_token_expires_in: self.jwt.access_token_expiry_secs,
        })
    }
}
