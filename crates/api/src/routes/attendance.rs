//! Attendance marking, daily journal and range summary.

use axum::{
    extract::State,
    Json,
};
use domain::models::attendance::{
    summarize, AttendanceQuery, ExportPolicy, StudentSummary, SummaryQuery,
    UpsertAttendanceRequest,
};
use domain::models::{Attendance, Student};
use domain::services::access;
use persistence::repositories::{AttendanceRepository, StudentRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiQuery, CurrentProfile};
use crate::middleware::metrics::record_attendance_marked;

/// GET /api/attendance?date=&group_id=
pub async fn list_attendance(
    State(state): State<AppState>,
    CurrentProfile(caller): CurrentProfile,
    ApiQuery(query): ApiQuery<AttendanceQuery>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    let scope = access::read_scope(&caller, query.group_id)?;
    let records = AttendanceRepository::new(state.pool.clone())
        .list_for_date(query.date, scope.group_id())
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /api/attendance
///
/// Creates or updates the record for `(student_id, date)`.
pub async fn upsert_attendance(
    State(state): State<AppState>,
    CurrentProfile(caller): CurrentProfile,
    ApiJson(request): ApiJson<UpsertAttendanceRequest>,
) -> Result<Json<Attendance>, ApiError> {
    request.validate()?;
    access::ensure_may_mark(&caller)?;

    let student = StudentRepository::new(state.pool.clone())
        .find_by_id(request.student_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    if let Some(group_id) = request.group_id {
        if group_id != student.group_id {
            return Err(ApiError::Validation(
                "Student does not belong to the given group".to_string(),
            ));
        }
    }

    access::ensure_can_mark(&caller, student.group_id)?;

    let record: Attendance = AttendanceRepository::new(state.pool.clone())
        .upsert(
            student.id,
            student.group_id,
            request.date,
            request.status,
            &request.comment_update(),
        )
        .await?
        .into();

    record_attendance_marked(record.status.as_str());
    info!(
        student_id = %record.student_id,
        group_id = %record.group_id,
        date = %record.date,
        status = %record.status,
        marked_by = %caller.id,
        "Attendance marked"
    );

    Ok(Json(record))
}

/// GET /api/attendance/summary?group_id=&from=&to=&collapse_partial=
pub async fn attendance_summary(
    State(state): State<AppState>,
    CurrentProfile(caller): CurrentProfile,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> Result<Json<Vec<StudentSummary>>, ApiError> {
    access::read_scope(&caller, Some(query.group_id))?;

    if !query.is_valid_range() {
        return Err(ApiError::Validation(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let policy = match query.collapse_partial {
        Some(collapse_partial_presence) => ExportPolicy {
            collapse_partial_presence,
        },
        None => state.config.export,
    };

    let students: Vec<Student> = StudentRepository::new(state.pool.clone())
        .list(Some(query.group_id))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let records: Vec<Attendance> = AttendanceRepository::new(state.pool.clone())
        .list_range(query.group_id, query.from, query.to)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(summarize(&students, &records, policy)))
}
