//! Student entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct StudentEntity {
    pub id: Uuid,
    pub full_name: String,
    pub group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<StudentEntity> for domain::models::Student {
    fn from(entity: StudentEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            group_id: entity.group_id,
            created_at: entity.created_at,
        }
    }
}
