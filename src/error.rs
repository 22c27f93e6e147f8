use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::{
    StoreError, RESTAURANTS_NAME_KEY, RESTAURANTS_OWNER_FKEY, RESTAURANTS_SLUG_KEY,
    REVIEWS_AUTHOR_FKEY, REVIEWS_RESTAURANT_FKEY, USERS_EMAIL_KEY,
};

/// One rejected input field, rendered next to the form control it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid data")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid status value: {0}")]
    InvalidStatusValue(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidStatusValue(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(constraint) => {
                let msg = match constraint.as_str() {
                    USERS_EMAIL_KEY => "A user with that email already exists",
                    RESTAURANTS_NAME_KEY => "A restaurant with this name already exists",
                    RESTAURANTS_SLUG_KEY => "A restaurant with this slug already exists",
                    _ => "Resource already exists",
                };
                AppError::Conflict(msg.into())
            }
            StoreError::ForeignKeyViolation(constraint) => match constraint.as_str() {
                REVIEWS_RESTAURANT_FKEY => AppError::NotFound("restaurant"),
                REVIEWS_AUTHOR_FKEY | RESTAURANTS_OWNER_FKEY => AppError::NotFound("user"),
                other => AppError::Internal(anyhow::anyhow!("foreign key violated: {other}")),
            },
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(details) => json!({ "error": "Invalid data", "details": details }),
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Collects every failing field before rejecting, so a form can highlight all of them at once.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("review").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidStatusValue("DONE".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err: AppError = StoreError::UniqueViolation(USERS_EMAIL_KEY.into()).into();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("email")));

        let err: AppError = StoreError::UniqueViolation(RESTAURANTS_NAME_KEY.into()).into();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("name")));
    }

    #[test]
    fn dangling_references_become_not_found() {
        let err: AppError = StoreError::ForeignKeyViolation(REVIEWS_RESTAURANT_FKEY.into()).into();
        assert!(matches!(err, AppError::NotFound("restaurant")));

        let err: AppError = StoreError::ForeignKeyViolation(REVIEWS_AUTHOR_FKEY.into()).into();
        assert!(matches!(err, AppError::NotFound("user")));

        let err: AppError = StoreError::ForeignKeyViolation("mystery_fkey".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn validation_errors_render_field_list() {
        let mut errors = FieldErrors::new();
        errors.push("name", "Restaurant name is required");
        errors.push("closingHour", "Closing time must be after opening time");
        let resp = errors.into_result().unwrap_err().into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid data");
        assert_eq!(body["details"][0]["field"], "name");
        assert_eq!(body["details"][1]["field"], "closingHour");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let resp = AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn require_flags_blank_values() {
        let mut errors = FieldErrors::new();
        errors.require("city", "   ", "City is required");
        errors.require("phone", "12345678", "Phone number is required");
        match errors.into_result() {
            Err(AppError::Validation(details)) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "city");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
