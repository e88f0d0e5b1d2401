//! Attendance repository for database operations.

use chrono::NaiveDate;
use domain::models::attendance::CommentUpdate;
use domain::models::AttendanceStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AttendanceEntity, AttendanceStatusDb};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records of one day, optionally restricted to a group.
    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        group_id: Option<Uuid>,
    ) -> Result<Vec<AttendanceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_attendance_for_date");
        let result = sqlx::query_as::<_, AttendanceEntity>(
            r#"
            SELECT id, student_id, group_id, date, status, comment, created_at, updated_at
            FROM attendance
            WHERE date = $1 AND ($2::uuid IS NULL OR group_id = $2)
            ORDER BY student_id
            "#,
        )
        .bind(date)
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records of a group within `from..=to`.
    pub async fn list_range(
        &self,
        group_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_attendance_range");
        let result = sqlx::query_as::<_, AttendanceEntity>(
            r#"
            SELECT id, student_id, group_id, date, status, comment, created_at, updated_at
            FROM attendance
            WHERE group_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date, student_id
            "#,
        )
        .bind(group_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts or updates the record for `(student_id, date)`.
    ///
    /// The stored comment changes only for `CommentUpdate::Set` and
    /// `CommentUpdate::Clear`.
    pub async fn upsert(
        &self,
        student_id: Uuid,
        group_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        comment: &CommentUpdate,
    ) -> Result<AttendanceEntity, sqlx::Error> {
        let (comment_value, replace_comment) = match comment {
            CommentUpdate::Keep => (None, false),
            CommentUpdate::Clear => (None, true),
            CommentUpdate::Set(text) => (Some(text.as_str()), true),
        };

        let timer = QueryTimer::new("upsert_attendance");
        let result = sqlx::query_as::<_, AttendanceEntity>(
            r#"
            INSERT INTO attendance (student_id, group_id, date, status, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, date) DO UPDATE
            SET status = EXCLUDED.status,
                group_id = EXCLUDED.group_id,
                comment = CASE WHEN $6 THEN EXCLUDED.comment ELSE attendance.comment END,
                updated_at = NOW()
            RETURNING id, student_id, group_id, date, status, comment, created_at, updated_at
            "#,
        )
        .bind(student_id)
        .bind(group_id)
        .bind(date)
        .bind(AttendanceStatusDb::from(status))
        .bind(comment_value)
        .bind(replace_comment)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_for_student(&self, student_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_attendance_for_student");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
