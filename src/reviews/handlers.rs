use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateReviewRequest, CreateReviewResponse, ModerationSnapshot, ReportResponse},
    moderation::ModerationAction,
    services,
};
use crate::{
    auth::extractors::{AuthUser, CurrentUser},
    error::AppError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/restaurant/report/:id", put(toggle_report))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), AppError> {
    let review = services::create_review(&state, user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse {
            message: "Review created successfully",
            review,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn toggle_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let (action, review) = state.moderation().toggle_report(id, user_id).await?;
    let message = match action {
        ModerationAction::Report => "Review reported successfully",
        _ => "Review unreported successfully",
    };
    Ok(Json(ReportResponse {
        message,
        review: ModerationSnapshot::from(&review),
    }))
}
