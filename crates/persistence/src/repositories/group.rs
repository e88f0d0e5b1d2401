//! Group repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GroupEntity;
use crate::metrics::QueryTimer;

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All groups ordered by name.
    pub async fn list(&self) -> Result<Vec<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_groups");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, created_at
            FROM groups
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, created_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_name");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            SELECT id, name, created_at
            FROM groups
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a group. A duplicate name fails with a unique violation.
    pub async fn create(&self, name: &str) -> Result<GroupEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_group");
        let result = sqlx::query_as::<_, GroupEntity>(
            r#"
            INSERT INTO groups (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a group with its students and their attendance.
    ///
    /// Returns false when no group had this id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_group");
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
