//! Login service.

use domain::models::Profile;
use persistence::repositories::UserRepository;
use shared::jwt::{IssuedToken, JwtConfig, JwtError};
use shared::password::{verify_login, PasswordError};
use sqlx::PgPool;
use thiserror::Error;

use crate::error::ApiError;

/// Errors that can occur while logging in.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

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
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            AuthError::TokenError(_) | AuthError::PasswordError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: IssuedToken,
    pub profile: Profile,
}

pub struct AuthService<'a> {
    users: UserRepository,
    jwt: &'a JwtConfig,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: PgPool, jwt: &'a JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Checks credentials and issues a session token.
    ///
    /// Unknown usernames and wrong passwords yield the same error, and both
    /// pay for one password hash.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = self.users.find_credentials(username.trim()).await?;

        let hash = credentials.as_ref().map(|c| c.password_hash.clone());
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_login(&password, hash.as_deref()))
            .await
            .map_err(|e| PasswordError::VerifyError(e.to_string()))??;

        let credentials = match credentials {
            Some(c) if verified => c,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let profile = self
            .users
            .find_profile(credentials.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.jwt.issue(profile.id)?;

        Ok(Session {
            token,
            profile: profile.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_invalid_credentials_maps_to_401() {
        let api: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
        assert!(matches!(api, ApiError::Unauthorized(msg) if msg == "Invalid username or password"));
    }

    #[test]
    fn test_token_error_maps_to_500() {
        let api: ApiError = AuthError::TokenError(JwtError::InvalidToken).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
