use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateRestaurantRequest, RestaurantWithReviews, UpdateRestaurantRequest},
    repo_types::{CreatedRestaurant, NewRestaurant, Restaurant, RestaurantUpdate},
    slug::unique_slug,
};
use crate::{
    db::RESTAURANTS_SLUG_KEY,
    error::{AppError, FieldErrors},
    reviews::{
        rating::{top_n, RankedRestaurant},
        repo_types::ScoreRow,
    },
    state::AppState,
};

/// Insert attempts when a concurrent request takes our slug between check and insert.
const SLUG_ATTEMPTS: usize = 3;
const LATEST_REVIEWS_PER_RESTAURANT: i64 = 3;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
}

/// Opening and closing time of day, validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenHours {
    pub opening_hour: u8,
    pub opening_minute: u8,
    pub closing_hour: u8,
    pub closing_minute: u8,
}

impl OpenHours {
    fn opening_minutes(&self) -> u32 {
        u32::from(self.opening_hour) * 60 + u32::from(self.opening_minute)
    }

    fn closing_minutes(&self) -> u32 {
        u32::from(self.closing_hour) * 60 + u32::from(self.closing_minute)
    }

    /// `HH:MM-HH:MM`
    pub fn format(&self) -> String {
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            self.opening_hour, self.opening_minute, self.closing_hour, self.closing_minute
        )
    }
}

fn check_range(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<i64>,
    max: i64,
    label: &str,
) -> Option<u8> {
    match value {
        None => {
            errors.push(field, &format!("{label} is required"));
            None
        }
        Some(v) if !(0..=max).contains(&v) => {
            errors.push(field, &format!("{label} must be between 0 and {max}"));
            None
        }
        Some(v) => Some(v as u8),
    }
}

fn check_website(errors: &mut FieldErrors, website: Option<&str>) {
    if let Some(url) = website.filter(|w| !w.is_empty()) {
        if !URL_RE.is_match(url) {
            errors.push("website", "Invalid website URL");
        }
    }
}

/// Checks every field and returns the parsed opening hours; closing must be strictly after opening.
pub fn validate_create(req: &CreateRestaurantRequest) -> Result<OpenHours, AppError> {
    let mut errors = FieldErrors::new();
    errors.require("name", &req.name, "Restaurant name is required");
    errors.require("addressLine", &req.address_line, "Address is required");
    errors.require("postalCode", &req.postal_code, "Postal code is required");
    errors.require("city", &req.city, "City is required");
    errors.require("description", &req.description, "Description is required");
    errors.require("phone", &req.phone, "Phone number is required");
    errors.require("image", &req.image, "Image is required");
    check_website(&mut errors, req.website.as_deref());

    let opening_hour = check_range(&mut errors, "openingHour", req.opening_hour, 23, "Opening hour");
    let opening_minute = check_range(&mut errors, "openingMinute", req.opening_minute, 59, "Opening minute");
    let closing_hour = check_range(&mut errors, "closingHour", req.closing_hour, 23, "Closing hour");
    let closing_minute = check_range(&mut errors, "closingMinute", req.closing_minute, 59, "Closing minute");

    let hours = match (opening_hour, opening_minute, closing_hour, closing_minute) {
        (Some(opening_hour), Some(opening_minute), Some(closing_hour), Some(closing_minute)) => {
            let hours = OpenHours {
                opening_hour,
                opening_minute,
                closing_hour,
                closing_minute,
            };
            if hours.closing_minutes() <= hours.opening_minutes() {
                errors.push("closingHour", "Closing time must be after opening time");
            }
            Some(hours)
        }
        _ => None,
    };

    errors.into_result()?;
    hours.ok_or_else(|| anyhow::anyhow!("hours validated without values").into())
}

pub fn validate_update(req: &UpdateRestaurantRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    errors.require("name", &req.name, "Restaurant name is required");
    errors.require("description", &req.description, "Description is required");
    errors.require("address", &req.address, "Address is required");
    errors.require("phone", &req.phone, "Phone number is required");
    errors.require("openHours", &req.open_hours, "Open hours are required");
    check_website(&mut errors, req.website.as_deref());
    errors.into_result()
}

pub fn compose_address(address_line: &str, postal_code: &str, city: &str) -> String {
    format!("{}, {} {}", address_line.trim(), postal_code.trim(), city.trim())
}

pub async fn create_restaurant(
    state: &AppState,
    owner_id: Uuid,
    req: CreateRestaurantRequest,
) -> Result<CreatedRestaurant, AppError> {
    let hours = validate_create(&req)?;
    let restaurants = state.restaurants.as_ref();

    // Fast path only; restaurants_name_key is the real guard.
    if restaurants.name_exists(&req.name).await? {
        warn!(name = %req.name, "restaurant name taken");
        return Err(AppError::conflict("A restaurant with this name already exists"));
    }

    let mut attempt = 1;
    loop {
        let slug = unique_slug(&req.name, |candidate| async move {
            restaurants.slug_exists(&candidate).await
        })
        .await?;

        let new = NewRestaurant {
            name: req.name.clone(),
            slug: slug.clone(),
            address: compose_address(&req.address_line, &req.postal_code, &req.city),
            description: req.description.clone(),
            open_hours: hours.format(),
            phone: req.phone.clone(),
            website: req.website.clone().unwrap_or_default(),
            image_url: req.image.clone(),
            owner_id,
        };

        match restaurants.create(new).await {
            Ok(created) => {
                info!(
                    restaurant_id = %created.restaurant.id,
                    %slug,
                    %owner_id,
                    role_updated = created.role_updated,
                    "restaurant created"
                );
                break Ok(created);
            }
            Err(e) if e.is_violation_of(RESTAURANTS_SLUG_KEY) && attempt < SLUG_ATTEMPTS => {
                warn!(%slug, attempt, "slug taken concurrently; regenerating");
                attempt += 1;
            }
            Err(e) => break Err(e.into()),
        }
    }
}

pub async fn update_restaurant(
    state: &AppState,
    id: Uuid,
    req: UpdateRestaurantRequest,
) -> Result<Restaurant, AppError> {
    validate_update(&req)?;
    // No ownership check: any signed-in user may edit, pending a product decision.
    let update = RestaurantUpdate {
        name: req.name,
        description: req.description,
        address: req.address,
        phone: req.phone,
        website: req.website.unwrap_or_default(),
        open_hours: req.open_hours,
    };
    state
        .restaurants
        .update(id, update)
        .await?
        .ok_or(AppError::NotFound("restaurant"))
}

pub async fn list_with_latest_reviews(state: &AppState) -> Result<Vec<RestaurantWithReviews>, AppError> {
    let restaurants = state.restaurants.list().await?;
    let mut out = Vec::with_capacity(restaurants.len());
    for restaurant in restaurants {
        let reviews = state
            .reviews
            .list_for_restaurant(restaurant.id, Some(LATEST_REVIEWS_PER_RESTAURANT))
            .await?;
        out.push(RestaurantWithReviews { restaurant, reviews });
    }
    Ok(out)
}

pub async fn detail_by_slug(state: &AppState, slug: &str) -> Result<RestaurantWithReviews, AppError> {
    let restaurant = state
        .restaurants
        .find_by_slug(slug)
        .await?
        .ok_or(AppError::NotFound("restaurant"))?;
    let reviews = state.reviews.list_for_restaurant(restaurant.id, None).await?;
    Ok(RestaurantWithReviews { restaurant, reviews })
}

pub async fn top_restaurants(state: &AppState, n: usize) -> Result<Vec<RankedRestaurant>, AppError> {
    let restaurants = state.restaurants.list().await?;
    let mut scores: HashMap<Uuid, Vec<ScoreRow>> = HashMap::new();
    for row in state.reviews.all_scores().await? {
        scores.entry(row.restaurant_id).or_default().push(row);
    }
    let input = restaurants
        .into_iter()
        .map(|r| {
            let reviews = scores.remove(&r.id).unwrap_or_default();
            (r, reviews)
        })
        .collect();
    Ok(top_n(input, n))
}
