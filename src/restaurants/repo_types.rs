use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub description: String,
    pub open_hours: String, // "HH:MM-HH:MM"
    pub phone: String,
    pub website: String,
    pub image_url: String,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub slug: String,
    pub address: String,
    pub description: String,
    pub open_hours: String,
    pub phone: String,
    pub website: String,
    pub image_url: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct RestaurantUpdate {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub open_hours: String,
}

/// Result of the transactional insert: the row and whether the owner was promoted with it.
#[derive(Debug, Clone)]
pub struct CreatedRestaurant {
    pub restaurant: Restaurant,
    pub role_updated: bool,
}
