use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::CreateReviewRequest,
    repo_types::{NewReview, Review},
};
use crate::{
    error::{AppError, FieldErrors},
    state::AppState,
};

fn check_score(errors: &mut FieldErrors, field: &str, label: &str, value: Option<i64>) -> i32 {
    match value {
        Some(v @ 1..=5) => v as i32,
        Some(_) => {
            errors.push(field, &format!("{label} must be between 1 and 5"));
            0
        }
        None => {
            errors.push(field, &format!("{label} is required"));
            0
        }
    }
}

/// Validates the body and returns it as an insertable review for `author_id`.
pub fn validate_review(req: CreateReviewRequest, author_id: Uuid) -> Result<NewReview, AppError> {
    let mut errors = FieldErrors::new();
    if req.restaurant_id.is_none() {
        errors.push("restaurantId", "Restaurant is required");
    }
    let taste_score = check_score(&mut errors, "tasteScore", "Taste score", req.taste_score);
    let service_score = check_score(&mut errors, "serviceScore", "Service score", req.service_score);
    let price_score = check_score(&mut errors, "priceScore", "Price score", req.price_score);
    errors.into_result()?;

    Ok(NewReview {
        restaurant_id: req.restaurant_id.unwrap_or_default(),
        author_id,
        taste_score,
        service_score,
        price_score,
        comment: req.comment.unwrap_or_default(),
        title: req.title.unwrap_or_default(),
    })
}

pub async fn create_review(
    state: &AppState,
    author_id: Uuid,
    req: CreateReviewRequest,
) -> Result<Review, AppError> {
    let new = validate_review(req, author_id)?;

    if state.restaurants.find_by_id(new.restaurant_id).await?.is_none() {
        warn!(restaurant_id = %new.restaurant_id, %author_id, "review for unknown restaurant");
        return Err(AppError::NotFound("restaurant"));
    }

    let review = state.reviews.create(new).await?;
    info!(review_id = %review.id, restaurant_id = %review.restaurant_id, %author_id, "review created");
    Ok(review)
}
