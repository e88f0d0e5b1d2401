//! Student routes.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use domain::models::student::{CreateStudentRequest, ListStudentsQuery};
use domain::models::Student;
use domain::services::access;
use persistence::repositories::{GroupRepository, StudentRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminProfile, ApiJson, ApiPath, ApiQuery, CurrentProfile};

/// GET /api/students?group_id=
///
/// A starosta always gets their own group.
pub async fn list_students(
    State(state): State<AppState>,
    CurrentProfile(caller): CurrentProfile,
    ApiQuery(query): ApiQuery<ListStudentsQuery>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let scope = access::read_scope(&caller, query.group_id)?;
    let students = StudentRepository::new(state.pool.clone())
        .list(scope.group_id())
        .await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

/// POST /api/students
pub async fn create_student(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiJson(request): ApiJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    request.validate()?;

    if GroupRepository::new(state.pool.clone())
        .find_by_id(request.group_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }

    let student: Student = StudentRepository::new(state.pool.clone())
        .create(request.full_name.trim(), request.group_id)
        .await?
        .into();

    info!(
        student_id = %student.id,
        group_id = %student.group_id,
        admin_id = %admin.id,
        "Student created"
    );
    Ok((StatusCode::CREATED, Json(student)))
}

/// DELETE /api/students/:student_id
pub async fn delete_student(
    State(state): State<AppState>,
    AdminProfile(admin): AdminProfile,
    ApiPath(student_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = StudentRepository::new(state.pool.clone())
        .delete(student_id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    info!(student_id = %student_id, admin_id = %admin.id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}
