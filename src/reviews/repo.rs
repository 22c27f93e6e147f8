use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{PgStore, StoreError},
    reviews::repo_types::{
        AuthoredReview, ModerationPatch, NewReview, Review, ReviewAuthorRow, ReviewStatus,
        ReviewSummary, ReviewWithAuthor, ScoreRow,
    },
};

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// New reviews always start as `PENDING`, not reported.
    async fn create(&self, new: NewReview) -> Result<Review, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, StoreError>;
    async fn find_with_author(&self, id: Uuid) -> Result<Option<ReviewWithAuthor>, StoreError>;
    /// Writes only the fields set in `patch`; `None` when the review does not exist.
    async fn apply_moderation(
        &self,
        id: Uuid,
        patch: ModerationPatch,
    ) -> Result<Option<Review>, StoreError>;
    /// Newest first.
    async fn list_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError>;
    /// Newest first.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AuthoredReview>, StoreError>;
    async fn list_reported(&self, status: ReviewStatus)
        -> Result<Vec<ReviewWithAuthor>, StoreError>;
    async fn list_summaries(&self) -> Result<Vec<ReviewSummary>, StoreError>;
    async fn all_scores(&self) -> Result<Vec<ScoreRow>, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

const REVIEW_COLUMNS: &str = r#"
    rv.id, rv.restaurant_id, rv.author_id, rv.taste_score, rv.service_score, rv.price_score,
    rv.comment, rv.title, rv.status, rv.reported, rv.created_at
"#;

const AUTHOR_COLUMNS: &str = r#"
    u.first_name AS author_first_name, u.last_name AS author_last_name, u.email AS author_email
"#;

#[async_trait]
impl ReviewStore for PgStore {
    async fn create(&self, new: NewReview) -> Result<Review, StoreError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews AS rv
                (id, restaurant_id, author_id, taste_score, service_score, price_score, comment, title)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.restaurant_id)
        .bind(new.author_id)
        .bind(new.taste_score)
        .bind(new.service_score)
        .bind(new.price_score)
        .bind(&new.comment)
        .bind(&new.title)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews rv WHERE rv.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<ReviewWithAuthor>, StoreError> {
        let row = sqlx::query_as::<_, ReviewAuthorRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}, {AUTHOR_COLUMNS}
              FROM reviews rv
              JOIN users u ON u.id = rv.author_id
             WHERE rv.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn apply_moderation(
        &self,
        id: Uuid,
        patch: ModerationPatch,
    ) -> Result<Option<Review>, StoreError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews AS rv
               SET status = COALESCE($2, rv.status),
                   reported = COALESCE($3, rv.reported)
             WHERE rv.id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.status)
        .bind(patch.reported)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewAuthorRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}, {AUTHOR_COLUMNS}
              FROM reviews rv
              JOIN users u ON u.id = rv.author_id
             WHERE rv.restaurant_id = $1
             ORDER BY rv.created_at DESC
             LIMIT $2
            "#
        ))
        .bind(restaurant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<AuthoredReview>, StoreError> {
        let rows = sqlx::query_as::<_, AuthoredReview>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}, r.name AS restaurant_name, r.slug AS restaurant_slug
              FROM reviews rv
              JOIN restaurants r ON r.id = rv.restaurant_id
             WHERE rv.author_id = $1
             ORDER BY rv.created_at DESC
            "#
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_reported(
        &self,
        status: ReviewStatus,
    ) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewAuthorRow>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}, {AUTHOR_COLUMNS}
              FROM reviews rv
              JOIN users u ON u.id = rv.author_id
             WHERE rv.status = $1 AND rv.reported
             ORDER BY rv.created_at DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_summaries(&self) -> Result<Vec<ReviewSummary>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewSummary>(
            r#"
            SELECT id, restaurant_id, title, status, created_at
              FROM reviews
             ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_scores(&self) -> Result<Vec<ScoreRow>, StoreError> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            "SELECT restaurant_id, taste_score, service_score, price_score FROM reviews",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
