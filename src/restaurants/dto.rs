use serde::{Deserialize, Serialize};

use super::repo_types::Restaurant;
use crate::reviews::repo_types::ReviewWithAuthor;

/// Missing fields deserialize to blanks so they surface as field errors, not a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub address_line: String,
    pub postal_code: String,
    pub city: String,
    pub description: String,
    pub opening_hour: Option<i64>,
    pub opening_minute: Option<i64>,
    pub closing_hour: Option<i64>,
    pub closing_minute: Option<i64>,
    pub phone: String,
    pub website: Option<String>,
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRestaurantRequest {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: Option<String>,
    pub open_hours: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantResponse {
    pub message: &'static str,
    pub restaurant: Restaurant,
    pub role_updated: bool,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantResponse {
    pub success: bool,
    pub message: &'static str,
    pub restaurant: Restaurant,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantWithReviews {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub reviews: Vec<ReviewWithAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub n: Option<usize>,
}
