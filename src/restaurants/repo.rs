use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    auth::repo_types::Role,
    db::{PgStore, StoreError},
    restaurants::repo_types::{CreatedRestaurant, NewRestaurant, Restaurant, RestaurantUpdate},
};

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;
    /// Case-sensitive equality.
    async fn name_exists(&self, name: &str) -> Result<bool, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Restaurant>, StoreError>;
    /// Only returns the restaurant when `owner_id` owns it.
    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Restaurant>, StoreError>;
    async fn list(&self) -> Result<Vec<Restaurant>, StoreError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Restaurant>, StoreError>;
    /// Inserts the restaurant and, in the same transaction, promotes a plain `User` owner who had no
    /// restaurant before to `restaurant owner`.
    async fn create(&self, new: NewRestaurant) -> Result<CreatedRestaurant, StoreError>;
    async fn update(
        &self,
        id: Uuid,
        update: RestaurantUpdate,
    ) -> Result<Option<Restaurant>, StoreError>;
    /// Deletes the restaurant's reviews, then the restaurant. `false` when it did not exist.
    async fn delete_cascade(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

const RESTAURANT_COLUMNS: &str = r#"
    id, name, slug, address, description, open_hours, phone, website, image_url, owner_id, created_at
"#;

/// Must run before the restaurant insert: the insert's foreign-key check takes `FOR KEY SHARE`
/// on the owner row, and upgrading to `FOR UPDATE` afterwards deadlocks two parallel creates.
async fn lock_owner(tx: &mut Transaction<'_, Postgres>, owner_id: Uuid) -> Result<(), StoreError> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(owner_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(())
}

/// Expects the owner row already locked by [`lock_owner`].
async fn promote_first_time_owner(
    tx: &mut Transaction<'_, Postgres>,
    owner_id: Uuid,
) -> Result<bool, StoreError> {
    let promoted = sqlx::query(
        r#"
        UPDATE users u
           SET role_id = (SELECT id FROM roles WHERE name = $2)
         WHERE u.id = $1
           AND u.role_id = (SELECT id FROM roles WHERE name = $3)
           AND (SELECT COUNT(*) FROM restaurants WHERE owner_id = $1) = 1
        "#,
    )
    .bind(owner_id)
    .bind(Role::RestaurantOwner.as_str())
    .bind(Role::User.as_str())
    .execute(&mut **tx)
    .await?
    .rows_affected();

    Ok(promoted == 1)
}

#[async_trait]
impl RestaurantStore for PgStore {
    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM restaurants WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM restaurants WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create(&self, new: NewRestaurant) -> Result<CreatedRestaurant, StoreError> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        lock_owner(&mut tx, new.owner_id).await?;

        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            INSERT INTO restaurants
                (id, name, slug, address, description, open_hours, phone, website, image_url, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.address)
        .bind(&new.description)
        .bind(&new.open_hours)
        .bind(&new.phone)
        .bind(&new.website)
        .bind(&new.image_url)
        .bind(new.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let role_updated = promote_first_time_owner(&mut tx, new.owner_id).await?;

        tx.commit().await.context("commit tx")?;
        Ok(CreatedRestaurant {
            restaurant,
            role_updated,
        })
    }

    async fn update(
        &self,
        id: Uuid,
        update: RestaurantUpdate,
    ) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            UPDATE restaurants
               SET name = $2, description = $3, address = $4, phone = $5, website = $6, open_hours = $7
             WHERE id = $1
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.address)
        .bind(&update.phone)
        .bind(&update.website)
        .bind(&update.open_hours)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        sqlx::query("DELETE FROM reviews WHERE restaurant_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await.context("commit tx")?;
        Ok(deleted == 1)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
