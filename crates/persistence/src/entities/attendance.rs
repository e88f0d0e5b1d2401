//! Attendance entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Attendance, AttendanceStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for attendance_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
pub enum AttendanceStatusDb {
    Present,
    Absent,
    Excused,
    Late,
    LeftEarly,
}

impl From<AttendanceStatusDb> for AttendanceStatus {
    fn from(db_status: AttendanceStatusDb) -> Self {
        match db_status {
            AttendanceStatusDb::Present => AttendanceStatus::Present,
            AttendanceStatusDb::Absent => AttendanceStatus::Absent,
            AttendanceStatusDb::Excused => AttendanceStatus::Excused,
            AttendanceStatusDb::Late => AttendanceStatus::Late,
            AttendanceStatusDb::LeftEarly => AttendanceStatus::LeftEarly,
        }
    }
}

impl From<AttendanceStatus> for AttendanceStatusDb {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => AttendanceStatusDb::Present,
            AttendanceStatus::Absent => AttendanceStatusDb::Absent,
            AttendanceStatus::Excused => AttendanceStatusDb::Excused,
            AttendanceStatus::Late => AttendanceStatusDb::Late,
            AttendanceStatus::LeftEarly => AttendanceStatusDb::LeftEarly,
        }
    }
}

/// Database row mapping for the attendance table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntity {
    pub id: i64,
    pub student_id: Uuid,
    pub group_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatusDb,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceEntity> for Attendance {
    fn from(entity: AttendanceEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            group_id: entity.group_id,
            date: entity.date,
            status: entity.status.into(),
            comment: entity.comment,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
