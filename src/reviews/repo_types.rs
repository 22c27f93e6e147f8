use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::repo_types::AuthorSummary, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "review_status", rename_all = "UPPERCASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "PENDING",
            ReviewStatus::Approved => "APPROVED",
            ReviewStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReviewStatus::Pending),
            "APPROVED" => Ok(ReviewStatus::Approved),
            "REJECTED" => Ok(ReviewStatus::Rejected),
            other => Err(AppError::InvalidStatusValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub author_id: Uuid,
    pub taste_score: i32,
    pub service_score: i32,
    pub price_score: i32,
    pub comment: String,
    pub title: String,
    pub status: ReviewStatus,
    pub reported: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub restaurant_id: Uuid,
    pub author_id: Uuid,
    pub taste_score: i32,
    pub service_score: i32,
    pub price_score: i32,
    pub comment: String,
    pub title: String,
}

/// Partial write of the moderation fields; `None` leaves the column untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModerationPatch {
    pub status: Option<ReviewStatus>,
    pub reported: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub author: AuthorSummary,
}

/// Flat row for `reviews JOIN users`, author columns prefixed to avoid clashing with `id`.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewAuthorRow {
    #[sqlx(flatten)]
    pub review: Review,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_email: String,
}

impl From<ReviewAuthorRow> for ReviewWithAuthor {
    fn from(r: ReviewAuthorRow) -> Self {
        Self {
            author: AuthorSummary {
                id: r.review.author_id,
                first_name: r.author_first_name,
                last_name: r.author_last_name,
                email: r.author_email,
            },
            review: r.review,
        }
    }
}

/// A review listed on its author's profile, with the restaurant it belongs to.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredReview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub restaurant_name: String,
    pub restaurant_slug: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub title: String,
    pub status: ReviewStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Just the three scores of a review, keyed by restaurant, for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ScoreRow {
    pub restaurant_id: Uuid,
    pub taste_score: i32,
    pub service_score: i32,
    pub price_score: i32,
}
