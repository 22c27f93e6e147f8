use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reviews::repo_types::{ReviewSummary, ReviewWithAuthor};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantOverview {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub reviews: Vec<ReviewSummary>,
}

/// Dashboard numbers; the `*Data` lists back each count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub active_users: i64,
    pub pending_reviews: usize,
    pub pending_reviews_data: Vec<ReviewWithAuthor>,
    pub approved_reviews: usize,
    pub approved_reviews_data: Vec<ReviewWithAuthor>,
    pub rejected_reviews: usize,
    pub rejected_reviews_data: Vec<ReviewWithAuthor>,
    pub total_restaurants: i64,
    pub total_restaurants_data: Vec<RestaurantOverview>,
    pub total_reviews: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub review: ReviewWithAuthor,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}
