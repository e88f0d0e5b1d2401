//! Profile and credential entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Profile, Role, UserListItem};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum RoleDb {
    Admin,
    Tutor,
    Starosta,
}

impl From<RoleDb> for Role {
    fn from(db_role: RoleDb) -> Self {
        match db_role {
            RoleDb::Admin => Role::Admin,
            RoleDb::Tutor => Role::Tutor,
            RoleDb::Starosta => Role::Starosta,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => RoleDb::Admin,
            Role::Tutor => RoleDb::Tutor,
            Role::Starosta => RoleDb::Starosta,
        }
    }
}

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub full_name: String,
    pub role: RoleDb,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            role: entity.role.into(),
            group_id: entity.group_id,
            created_at: entity.created_at,
        }
    }
}

/// Login row. Never leaves the persistence and auth layers.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialsEntity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Profile joined with its login and group name.
#[derive(Debug, Clone, FromRow)]
pub struct UserListEntity {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: RoleDb,
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserListEntity> for UserListItem {
    fn from(entity: UserListEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            full_name: entity.full_name,
            role: entity.role.into(),
            group_id: entity.group_id,
            group_name: entity.group_name,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_db_conversion() {
        for role in [Role::Admin, Role::Tutor, Role::Starosta] {
            assert_eq!(Role::from(RoleDb::from(role)), role);
        }
    }
}
