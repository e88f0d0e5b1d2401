//! Login and current-profile routes.

use axum::{extract::State, Json};
use domain::models::user::{LoginRequest, LoginResponse};
use domain::models::Profile;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, CurrentProfile};
use crate::middleware::metrics::record_login;
use crate::services::auth::{AuthError, AuthService};

/// POST /api/login
///
/// Exchanges username and password for a session token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    if let Some(limiter) = &state.login_limiter {
        if let Err(retry_after_secs) = limiter.check(&request.username) {
            record_login("rate_limited");
            warn!(username = %request.username, retry_after_secs, "Login rate limited");
            return Err(ApiError::RateLimited { retry_after_secs });
        }
    }

    let service = AuthService::new(state.pool.clone(), &state.jwt);
    let session = match service.login(&request.username, &request.password).await {
        Ok(session) => session,
        Err(AuthError::InvalidCredentials) => {
            record_login("invalid");
            info!(username = %request.username, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    record_login("success");
    info!(
        profile_id = %session.profile.id,
        role = %session.profile.role,
        jti = %session.token.jti,
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token: session.token.token,
        token_type: "Bearer".to_string(),
        expires_in: session.token.expires_in,
        profile: session.profile,
    }))
}

/// GET /api/profile
pub async fn get_profile(CurrentProfile(profile): CurrentProfile) -> Json<Profile> {
    Json(profile)
}
