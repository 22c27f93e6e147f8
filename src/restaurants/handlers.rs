use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        CreateRestaurantRequest, CreateRestaurantResponse, RestaurantWithReviews, TopQuery,
        UpdateRestaurantRequest, UpdateRestaurantResponse,
    },
    services,
};
use crate::{
    auth::extractors::{AuthUser, CurrentUser},
    error::AppError,
    reviews::rating::RankedRestaurant,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/top", get(top_restaurants))
}

/// `/restaurant/:id` takes a slug on GET and an id on PUT.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", post(create_restaurant))
        .route("/restaurant/:id", get(get_restaurant).put(update_restaurant))
}

#[instrument(skip(state))]
pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantWithReviews>>, AppError> {
    Ok(Json(services::list_with_latest_reviews(&state).await?))
}

#[instrument(skip(state))]
pub async fn top_restaurants(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<RankedRestaurant>>, AppError> {
    let n = q.n.unwrap_or(state.config.top_restaurants_default);
    Ok(Json(services::top_restaurants(&state, n).await?))
}

#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RestaurantWithReviews>, AppError> {
    Ok(Json(services::detail_by_slug(&state, &slug).await?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<CreateRestaurantResponse>), AppError> {
    let created = services::create_restaurant(&state, user.id, payload).await?;
    let redirect = format!("/restaurant/{}", created.restaurant.slug);
    Ok((
        StatusCode::CREATED,
        Json(CreateRestaurantResponse {
            message: "Restaurant created successfully",
            restaurant: created.restaurant,
            role_updated: created.role_updated,
            redirect,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> Result<Json<UpdateRestaurantResponse>, AppError> {
    let restaurant = services::update_restaurant(&state, id, payload).await?;
    Ok(Json(UpdateRestaurantResponse {
        success: true,
        message: "Restaurant updated successfully",
        restaurant,
    }))
}
