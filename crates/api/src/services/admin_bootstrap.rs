//! Admin bootstrap for initial setup.
//!
//! Creates the configured administrator on startup when no login with that
//! username exists yet. Later startups leave the account alone.

use domain::models::Role;
use persistence::repositories::{NewUser, UserRepository};
use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What the bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Creates the bootstrap admin if configured and missing.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if !config.is_configured() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let username = shared::validation::normalize_username(&config.username);
    let username = username.as_str();
    shared::validation::validate_username(username)
        .map_err(|_| BootstrapError::Config(format!("Invalid admin username: {}", username)))?;

    let users = UserRepository::new(pool.clone());
    if users.username_exists(username).await? {
        info!(username = %username, "Bootstrap admin already exists - skipping");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    if config.password.is_empty() {
        warn!(
            "VD__ADMIN__USERNAME is set but VD__ADMIN__PASSWORD is empty - skipping bootstrap"
        );
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let password_hash = hash_password(&config.password)?;
    let full_name = config.full_name.trim();
    let full_name = if full_name.is_empty() {
        "Administrator"
    } else {
        full_name
    };

    let profile = users
        .create(NewUser {
            username,
            password_hash: &password_hash,
            full_name,
            role: Role::Admin,
            group_id: None,
        })
        .await?;

    info!(
        username = %username,
        profile_id = %profile.id,
        "Bootstrap admin created"
    );
    warn!("SECURITY: remove VD__ADMIN__PASSWORD from configuration after initial setup");

    Ok(BootstrapOutcome::Created)
}
