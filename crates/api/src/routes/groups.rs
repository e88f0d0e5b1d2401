//! Group management routes.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use domain::models::group::CreateGroupRequest;
use domain::models::Group;
use persistence::repositories::GroupRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminProfile, ApiJson, ApiPath, CurrentProfile};

/// GET /api/groups
///
/// Every role may list groups; the client uses the list for selectors.
pub async fn list_groups(
    State(state): State<AppState>,
    _caller: CurrentProfile,
) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone()).list().await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// POST /api/groups
pub async fn create_group(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiJson(request): ApiJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());
    let name = request.normalized_name();
    if repo.find_by_name(name).await?.is_some() {
        return Err(ApiError::Conflict(format!("Group '{}' already exists", name)));
    }

    let group: Group = repo.create(name).await?.into();

    info!(group_id = %group.id, name = %group.name, admin_id = %admin.id, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// DELETE /api/groups/:group_id
///
/// Removes the group's students and their attendance too.
pub async fn delete_group(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiPath(group_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = GroupRepository::new(state.pool.clone())
        .delete(group_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    info!(group_id = %group_id, admin_id = %admin.id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}
