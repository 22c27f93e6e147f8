use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AuthResponse, LoginRequest, MeResponse, OwnedRestaurant, ProfileRequest, ProfileResponse,
        PublicUser, RefreshRequest, RegisterRequest,
    },
    extractors::CurrentUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::{NewUser, ProfileUpdate, Role, User},
    services::{validate_profile, validate_registration},
};
use crate::{error::AppError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/profile", get(get_profile).post(update_profile))
}

fn issue_tokens(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: PublicUser::from(user),
    })
}

/// Emails are stored as typed; only surrounding whitespace is dropped.
fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = normalize_email(&payload.email);
    payload.first_name = payload.first_name.trim().to_string();
    payload.last_name = payload.last_name.trim().to_string();
    validate_registration(&payload)?;

    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password_hash: hash_password(&payload.password)?,
            role: Role::User,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "register rejected by store");
            AppError::from(e)
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, &user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, &user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AppError::unauthorized("Invalid refresh token")
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    Ok(Json(issue_tokens(&state, &user)?))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    let reviews = state.reviews.list_by_author(user.id).await?;

    let mut restaurants = Vec::new();
    for restaurant in state.restaurants.list_by_owner(user.id).await? {
        let reviews = state.reviews.list_for_restaurant(restaurant.id, None).await?;
        restaurants.push(OwnedRestaurant { restaurant, reviews });
    }

    Ok(Json(MeResponse {
        user: PublicUser::from(&user),
        created_at: user.created_at,
        reviews,
        restaurants,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    })
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    payload.email = normalize_email(&payload.email);
    payload.first_name = payload.first_name.trim().to_string();
    payload.last_name = payload.last_name.trim().to_string();
    validate_profile(&payload)?;

    let password_hash = match payload.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let updated = state
        .users
        .update_profile(
            user.id,
            ProfileUpdate {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                password_hash,
            },
        )
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!(user_id = %updated.id, "profile updated");
    Ok(Json(ProfileResponse {
        first_name: updated.first_name,
        last_name: updated.last_name,
        email: updated.email,
    }))
}
