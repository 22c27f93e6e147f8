//! Aggregate ratings and the top-N ranking.
//!
//! A review's rating is the unweighted mean of its taste, service and price scores; a restaurant's
//! rating is the mean of its reviews' ratings. Scores are used as stored, never clipped.

use serde::Serialize;
use uuid::Uuid;

use super::repo_types::{Review, ScoreRow};
use crate::restaurants::repo_types::Restaurant;

pub trait Scored {
    fn scores(&self) -> (i32, i32, i32);

    fn mean_score(&self) -> f64 {
        let (taste, service, price) = self.scores();
        f64::from(taste + service + price) / 3.0
    }
}

impl Scored for Review {
    fn scores(&self) -> (i32, i32, i32) {
        (self.taste_score, self.service_score, self.price_score)
    }
}

impl Scored for ScoreRow {
    fn scores(&self) -> (i32, i32, i32) {
        (self.taste_score, self.service_score, self.price_score)
    }
}

/// Mean of the per-review means; exactly 0 for no reviews.
pub fn average_rating<R: Scored>(reviews: &[R]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(Scored::mean_score).sum();
    total / reviews.len() as f64
}

/// Display rating, one decimal.
pub fn round_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRestaurant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub average_rating: f64,
    pub review_count: usize,
    pub image_url: Option<String>,
    #[serde(skip)]
    pub raw_rating: f64,
}

/// Ranks restaurants by average rating, best first, keeping at most `n`.
///
/// Restaurants without reviews are left out. Ties keep their input order.
pub fn top_n<R: Scored>(restaurants: Vec<(Restaurant, Vec<R>)>, n: usize) -> Vec<RankedRestaurant> {
    let mut ranked: Vec<RankedRestaurant> = restaurants
        .into_iter()
        .filter(|(_, reviews)| !reviews.is_empty())
        .map(|(r, reviews)| {
            let rating = average_rating(&reviews);
            RankedRestaurant {
                id: r.id,
                name: r.name,
                slug: r.slug,
                address: r.address,
                average_rating: round_rating(rating),
                review_count: reviews.len(),
                image_url: Some(r.image_url).filter(|u| !u.is_empty()),
                raw_rating: rating,
            }
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.raw_rating.total_cmp(&a.raw_rating));
    ranked.truncate(n);
    ranked
}
