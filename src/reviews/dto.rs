use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Review, ReviewStatus};

/// Scores stay untyped until validation so out-of-range or missing values land in the field list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReviewRequest {
    pub restaurant_id: Option<Uuid>,
    pub taste_score: Option<i64>,
    pub service_score: Option<i64>,
    pub price_score: Option<i64>,
    pub comment: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewResponse {
    pub message: &'static str,
    pub review: Review,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationSnapshot {
    pub id: Uuid,
    pub status: ReviewStatus,
    pub reported: bool,
}

impl From<&Review> for ModerationSnapshot {
    fn from(r: &Review) -> Self {
        Self {
            id: r.id,
            status: r.status,
            reported: r.reported,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub message: &'static str,
    pub review: ModerationSnapshot,
}
