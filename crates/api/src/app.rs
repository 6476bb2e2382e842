use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use domain::services::{GatewayError, PaymentGateway};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{
    auth, health, meetings, payments, questions, reservations, settlements, users,
};
use crate::services::{auth::jwt_from_config, build_gateway};

/// Errors while assembling the application state.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Payment gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Build the state from configuration, using the configured payment gateway.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, StartupError> {
        let gateway = build_gateway(&config.payment)?;
        Self::with_gateway(config, pool, gateway)
    }

    /// Build the state around an explicit payment gateway.
    pub fn with_gateway(
        config: Config,
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, StartupError> {
        let jwt = Arc::new(jwt_from_config(&config.jwt)?);

        // Rate limiting is off when rate_limit_per_minute is 0
        let rate_limiter = if config.security.rate_limit_per_minute > 0 {
            Some(Arc::new(RateLimiterState::new(
                config.security.rate_limit_per_minute,
            )))
        } else {
            None
        };

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt,
            gateway,
            rate_limiter,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Bearer authentication is enforced per handler by the UserAuth extractor,
    // so public and protected methods can share a path.
    let account_routes = Router::new()
        .route("/users", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route(
            "/mypage/profile",
            get(users::get_profile).delete(users::withdraw),
        );

    let meeting_routes = Router::new()
        .route(
            "/meetings",
            get(meetings::search_meetings).post(meetings::create_meeting),
        )
        .route("/meetings/:id", get(meetings::get_meeting))
        .route("/meetings/:id/close", patch(meetings::close_meeting))
        .route(
            "/meetings/:id/questions",
            get(questions::list_questions).post(questions::create_question),
        )
        .route("/mypage/meetings/hosts", get(meetings::hosted_meetings))
        .route(
            "/mypage/meetings/participants",
            get(meetings::participated_meetings),
        );

    let reservation_routes = Router::new()
        .route("/meetings/:id/reservations", post(reservations::reserve))
        .route(
            "/meetings/:id/reservations/:reservation_id",
            patch(reservations::decide).delete(reservations::cancel),
        )
        .route("/payments/success", get(payments::payment_success))
        .route("/payments/fail", get(payments::payment_fail))
        .route("/mypage/settlements", get(settlements::list_settlements));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(meeting_routes)
        .merge(reservation_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
