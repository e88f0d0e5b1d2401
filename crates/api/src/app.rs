use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
    LoginRateLimiter, SecurityHeaders,
};
use crate::routes::{admin_users, attendance, auth, frontend, groups, health, students};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub login_limiter: Option<Arc<LoginRateLimiter>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);

    let jwt = JwtConfig::with_leeway(
        &config.jwt.secret,
        config.jwt.token_expiry_secs,
        config.jwt.leeway_secs,
    )?;

    // None when login_rate_limit_per_minute is 0
    let login_limiter =
        LoginRateLimiter::new(config.security.login_rate_limit_per_minute).map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt: Arc::new(jwt),
        login_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
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

    // Authentication happens in the CurrentProfile / AdminProfile extractors.
    let api_routes = Router::new()
        .route("/api/profile", get(auth::get_profile))
        .route(
            "/api/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/api/groups/:group_id", delete(groups::delete_group))
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/api/students/:student_id", delete(students::delete_student))
        .route(
            "/api/attendance",
            get(attendance::list_attendance).post(attendance::upsert_attendance),
        )
        .route(
            "/api/attendance/summary",
            get(attendance::attendance_summary),
        )
        .route(
            "/api/admin/users",
            get(admin_users::list_users).post(admin_users::create_user),
        )
        .route(
            "/api/admin/users/:user_id",
            patch(admin_users::update_user).delete(admin_users::delete_user),
        );

    let public_routes = Router::new()
        .route("/api/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let security_headers = SecurityHeaders {
        hsts: config.security.hsts_enabled,
    };

    Ok(Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(frontend::serve_frontend)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
