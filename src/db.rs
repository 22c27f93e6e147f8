use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const RESTAURANTS_NAME_KEY: &str = "restaurants_name_key";
pub const RESTAURANTS_SLUG_KEY: &str = "restaurants_slug_key";
// Postgres default names for the REFERENCES clauses in 0001_init.sql.
pub const REVIEWS_RESTAURANT_FKEY: &str = "reviews_restaurant_id_fkey";
pub const REVIEWS_AUTHOR_FKEY: &str = "reviews_author_id_fkey";
pub const RESTAURANTS_OWNER_FKEY: &str = "restaurants_owner_id_fkey";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The referenced row is gone, e.g. deleted between a lookup and this write.
    #[error("foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_violation_of(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation(c) if c == constraint)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Backend(anyhow::Error::new(e))
    }
}

/// Postgres-backed implementation of every store trait, sharing one pool for the process lifetime.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}
