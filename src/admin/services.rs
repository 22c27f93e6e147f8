use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use super::dto::{AdminStats, RestaurantOverview};
use crate::{
    auth::repo_types::Role,
    error::AppError,
    reviews::{moderation::require_admin, repo_types::ReviewSummary},
    state::AppState,
};

pub async fn stats(state: &AppState, actor_role: Role) -> Result<AdminStats, AppError> {
    let reported = state.moderation().reported_reviews(actor_role).await?;

    let since = OffsetDateTime::now_utc() - Duration::days(state.config.active_user_window_days);
    let total_users = state.users.count().await?;
    let active_users = state.users.count_active_since(since).await?;

    let mut by_restaurant: HashMap<Uuid, Vec<ReviewSummary>> = HashMap::new();
    for summary in state.reviews.list_summaries().await? {
        by_restaurant.entry(summary.restaurant_id).or_default().push(summary);
    }
    let total_restaurants_data: Vec<_> = state
        .restaurants
        .list()
        .await?
        .into_iter()
        .map(|r| RestaurantOverview {
            reviews: by_restaurant.remove(&r.id).unwrap_or_default(),
            id: r.id,
            name: r.name,
            slug: r.slug,
        })
        .collect();

    Ok(AdminStats {
        total_users,
        active_users,
        pending_reviews: reported.pending_count(),
        approved_reviews: reported.approved_count(),
        rejected_reviews: reported.rejected_count(),
        pending_reviews_data: reported.pending,
        approved_reviews_data: reported.approved,
        rejected_reviews_data: reported.rejected,
        total_restaurants: state.restaurants.count().await?,
        total_restaurants_data,
        total_reviews: state.reviews.count().await?,
    })
}

pub async fn delete_restaurant(state: &AppState, id: Uuid, actor_role: Role) -> Result<(), AppError> {
    require_admin(actor_role)?;
    if !state.restaurants.delete_cascade(id).await? {
        return Err(AppError::NotFound("restaurant"));
    }
    info!(restaurant_id = %id, "restaurant deleted with its reviews");
    Ok(())
}
