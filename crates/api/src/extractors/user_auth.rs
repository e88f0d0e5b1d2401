//! Session authentication extractors.
//!
//! `CurrentProfile` validates the Bearer token and loads the caller's
//! profile; a token whose profile was deleted is rejected like an invalid
//! one. `AdminProfile` additionally requires the admin role.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use domain::models::Profile;
use domain::services::access::ensure_admin;
use persistence::repositories::UserRepository;
use shared::jwt::{extract_profile_id, JwtConfig};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentProfile(pub Profile);

/// The authenticated caller, known to be an admin.
#[derive(Debug, Clone)]
pub struct AdminProfile(pub Profile);

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Validates a token and returns the profile id it was issued for.
pub fn authenticate_token(jwt: &JwtConfig, token: &str) -> Result<Uuid, ApiError> {
    let claims = jwt.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;
    extract_profile_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(profile) = parts.extensions.get::<CurrentProfile>() {
            return Ok(profile.clone());
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = bearer_token(header_value).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let profile_id = authenticate_token(&state.jwt, token)?;

        let profile = UserRepository::new(state.pool.clone())
            .find_profile(profile_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Profile no longer exists".to_string()))?;

        let current = CurrentProfile(profile.into());
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminProfile {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentProfile(profile) = CurrentProfile::from_request_parts(parts, state).await?;
        ensure_admin(&profile).map_err(|e| {
            tracing::debug!(profile_id = %profile.id, role = %profile.role, "Admin access denied");
            ApiError::from(e)
        })?;
        Ok(AdminProfile(profile))
    }
}
