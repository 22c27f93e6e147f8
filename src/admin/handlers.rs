use axum::{
    extract::{Path, State},
    routing::{delete, get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AdminStats, DeleteResponse, StatusRequest, StatusResponse},
    services,
};
use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/review/:id", patch(set_review_status))
        .route("/admin/restaurant/:id", delete(delete_restaurant))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(services::stats(&state, user.role).await?))
}

#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
pub async fn set_review_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let review = state
        .moderation()
        .set_status(id, &payload.status, user.role)
        .await?;
    Ok(Json(StatusResponse {
        message: "Review status updated successfully",
        review,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id, restaurant_id = %id))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    services::delete_restaurant(&state, id, user.role).await?;
    Ok(Json(DeleteResponse {
        message: "Restaurant and its reviews deleted successfully",
    }))
}
