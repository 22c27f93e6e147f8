use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, ProfileUpdate, User, UserRow},
    db::{PgStore, StoreError},
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `UniqueViolation(users_email_key)` for a taken email.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
    /// Users who wrote at least one review at or after `since`.
    async fn count_active_since(&self, since: OffsetDateTime) -> Result<i64, StoreError>;
}

const USER_COLUMNS: &str = r#"
    u.id, u.email, u.first_name, u.last_name, u.password_hash, r.name AS role, u.created_at
"#;

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(StoreError::Backend)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_user).transpose()
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            WITH inserted AS (
                INSERT INTO users (id, email, first_name, last_name, password_hash, role_id)
                SELECT $1, $2, $3, $4, $5, r.id FROM roles r WHERE r.name = $6
                RETURNING *
            )
            SELECT {USER_COLUMNS} FROM inserted u JOIN roles r ON r.id = u.role_id
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("role {:?} not seeded", new.role.as_str()))?;
        into_user(row)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            WITH updated AS (
                UPDATE users
                   SET first_name = $2,
                       last_name = $3,
                       email = $4,
                       password_hash = COALESCE($5, password_hash)
                 WHERE id = $1
                RETURNING *
            )
            SELECT {USER_COLUMNS} FROM updated u JOIN roles r ON r.id = u.role_id
            "#
        ))
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(update.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_user).transpose()
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn count_active_since(&self, since: OffsetDateTime) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT author_id)
              FROM reviews
             WHERE created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }
}
