//! Student repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::StudentEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Students of one group, or of every group when `group_id` is `None`,
    /// ordered by name.
    pub async fn list(&self, group_id: Option<Uuid>) -> Result<Vec<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_students");
        let result = sqlx::query_as::<_, StudentEntity>(
            r#"
            SELECT id, full_name, group_id, created_at
            FROM students
            WHERE ($1::uuid IS NULL OR group_id = $1)
            ORDER BY full_name, id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_student_by_id");
        let result = sqlx::query_as::<_, StudentEntity>(
            r#"
            SELECT id, full_name, group_id, created_at
            FROM students
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Adds a student. An unknown group fails with a foreign key violation.
    pub async fn create(&self, full_name: &str, group_id: Uuid) -> Result<StudentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_student");
        let result = sqlx::query_as::<_, StudentEntity>(
            r#"
            INSERT INTO students (full_name, group_id)
            VALUES ($1, $2)
            RETURNING id, full_name, group_id, created_at
            "#,
        )
        .bind(full_name)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a student and their attendance. Returns false when missing.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_student");
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
