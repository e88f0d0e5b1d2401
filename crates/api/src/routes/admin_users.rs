//! Admin user management routes.
//!
//! A user is a profile plus its login. Every handler here requires the
//! admin role.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use domain::models::user::{CreateUserRequest, UpdateUserRequest};
use domain::models::{Profile, Role, UserListItem};
use persistence::repositories::{GroupRepository, NewUser, UserRepository, UserUpdate};
use shared::password::{hash_password, PasswordError};
use shared::validation::normalize_username;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminProfile, ApiJson, ApiPath};

const STAROSTA_GROUP_REQUIRED: &str = "A starosta must be assigned to a group";

/// Hashes off the async runtime.
async fn hash_in_background(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e: PasswordError| ApiError::Internal(e.to_string()))
}

async fn ensure_group_exists(state: &AppState, group_id: Option<Uuid>) -> Result<(), ApiError> {
    let Some(group_id) = group_id else {
        return Ok(());
    };
    GroupRepository::new(state.pool.clone())
        .find_by_id(group_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminProfile,
) -> Result<Json<Vec<UserListItem>>, ApiError> {
    let users = UserRepository::new(state.pool.clone()).list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    request.validate()?;

    if !request.has_required_group() {
        return Err(ApiError::Validation(STAROSTA_GROUP_REQUIRED.to_string()));
    }
    ensure_group_exists(&state, request.group_id).await?;

    let repo = UserRepository::new(state.pool.clone());
    let username = normalize_username(&request.username);
    if repo.username_exists(&username).await? {
        return Err(ApiError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let password_hash = hash_in_background(request.password.clone()).await?;
    let profile: Profile = repo
        .create(NewUser {
            username: &username,
            password_hash: &password_hash,
            full_name: request.full_name.trim(),
            role: request.role,
            group_id: request.group_id,
        })
        .await?
        .into();

    info!(
        profile_id = %profile.id,
        role = %profile.role,
        admin_id = %admin.id,
        "User created"
    );
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PATCH /api/admin/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<Profile>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let current: Profile = repo
        .find_profile(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    if request.is_empty() {
        return Ok(Json(current));
    }

    let (role, group_id) = request.resulting_assignment(&current);
    if role == Role::Starosta && group_id.is_none() {
        return Err(ApiError::Validation(STAROSTA_GROUP_REQUIRED.to_string()));
    }
    if request.group_id.is_some() {
        ensure_group_exists(&state, group_id).await?;
    }

    let username = request.username.as_deref().map(normalize_username);
    if let Some(username) = &username {
        let taken = repo
            .find_credentials(username)
            .await?
            .is_some_and(|existing| existing.id != user_id);
        if taken {
            return Err(ApiError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
    }

    let password_hash = match &request.password {
        Some(password) => Some(hash_in_background(password.clone()).await?),
        None => None,
    };

    let profile: Profile = repo
        .update(
            user_id,
            UserUpdate {
                username: username.as_deref(),
                password_hash: password_hash.as_deref(),
                full_name: request.full_name.as_deref().map(str::trim),
                role: request.role,
                group_id: request.group_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    info!(
        profile_id = %profile.id,
        role = %profile.role,
        password_changed = password_hash.is_some(),
        admin_id = %admin.id,
        "User updated"
    );
    Ok(Json(profile))
}

/// DELETE /api/admin/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if user_id == admin.id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = UserRepository::new(state.pool.clone())
        .delete(user_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(profile_id = %user_id, admin_id = %admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
