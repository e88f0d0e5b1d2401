//! User repository: profiles together with their login credentials.

use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CredentialsEntity, ProfileEntity, RoleDb, UserListEntity};
use crate::metrics::QueryTimer;

/// Input for creating a profile with its login.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    pub group_id: Option<Uuid>,
}

/// Partial update. `None` leaves a column unchanged; `group_id: Some(None)`
/// clears the group.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate<'a> {
    pub username: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub role: Option<Role>,
    pub group_id: Option<Option<Uuid>>,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_profile(&self, id: Uuid) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, full_name, role, group_id, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Case-insensitive lookup of a login.
    pub async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<CredentialsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_credentials_by_username");
        let result = sqlx::query_as::<_, CredentialsEntity>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE LOWER(username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("username_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every profile with its username and group name, ordered by name.
    pub async fn list(&self) -> Result<Vec<UserListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserListEntity>(
            r#"
            SELECT p.id, u.username, p.full_name, p.role, p.group_id,
                   g.name AS group_name, p.created_at
            FROM profiles p
            JOIN users u ON u.id = p.id
            LEFT JOIN groups g ON g.id = p.group_id
            ORDER BY p.full_name, u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates the profile and its login in one transaction.
    pub async fn create(&self, user: NewUser<'_>) -> Result<ProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (full_name, role, group_id)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, role, group_id, created_at
            "#,
        )
        .bind(user.full_name)
        .bind(RoleDb::from(user.role))
        .bind(user.group_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(profile.id)
        .bind(user.username)
        .bind(user.password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(profile)
    }

    /// Applies a partial update in one transaction.
    ///
    /// Returns `None` when the profile does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        update: UserUpdate<'_>,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user");
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, ProfileEntity>(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($2, full_name),
                role = COALESCE($3, role),
                group_id = CASE WHEN $4 THEN $5 ELSE group_id END
            WHERE id = $1
            RETURNING id, full_name, role, group_id, created_at
            "#,
        )
        .bind(id)
        .bind(update.full_name)
        .bind(update.role.map(RoleDb::from))
        .bind(update.group_id.is_some())
        .bind(update.group_id.flatten())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(profile) = profile else {
            return Ok(None);
        };

        if update.username.is_some() || update.password_hash.is_some() {
            sqlx::query(
                r#"
                UPDATE users
                SET username = COALESCE($2, username),
                    password_hash = COALESCE($3, password_hash),
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(update.username)
            .bind(update.password_hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(Some(profile))
    }

    /// Deletes a profile and its login. Returns false when missing.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
