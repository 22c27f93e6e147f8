//! Review moderation: the owner's report toggle and the admin status decisions.
//!
//! `status` and `reported` are independent. Reporting always forces `PENDING`; unreporting clears
//! the flag and leaves `status` where the report put it. Admin decisions set `status` and never
//! touch `reported`. No state is terminal.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    repo::ReviewStore,
    repo_types::{ModerationPatch, Review, ReviewStatus, ReviewWithAuthor},
};
use crate::{auth::repo_types::Role, error::AppError, restaurants::repo::RestaurantStore};

pub const NOT_YOUR_RESTAURANT: &str = "You can only moderate reviews for your own restaurant";
pub const ADMIN_REQUIRED: &str = "Admin access required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationState {
    pub status: ReviewStatus,
    pub reported: bool,
}

impl ModerationState {
    pub const INITIAL: ModerationState = ModerationState {
        status: ReviewStatus::Pending,
        reported: false,
    };

    pub fn of(review: &Review) -> Self {
        Self {
            status: review.status,
            reported: review.reported,
        }
    }

    pub fn apply(self, patch: ModerationPatch) -> Self {
        Self {
            status: patch.status.unwrap_or(self.status),
            reported: patch.reported.unwrap_or(self.reported),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Report,
    Unreport,
    SetStatus(ReviewStatus),
}

impl ModerationAction {
    /// The owner endpoint flips whatever `reported` currently is.
    pub fn toggle_for(reported: bool) -> Self {
        if reported {
            ModerationAction::Unreport
        } else {
            ModerationAction::Report
        }
    }

    pub fn patch(self) -> ModerationPatch {
        match self {
            ModerationAction::Report => ModerationPatch {
                status: Some(ReviewStatus::Pending),
                reported: Some(true),
            },
            ModerationAction::Unreport => ModerationPatch {
                status: None,
                reported: Some(false),
            },
            ModerationAction::SetStatus(status) => ModerationPatch {
                status: Some(status),
                reported: None,
            },
        }
    }
}

/// Reported reviews grouped by status for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedReviews {
    pub pending: Vec<ReviewWithAuthor>,
    pub approved: Vec<ReviewWithAuthor>,
    pub rejected: Vec<ReviewWithAuthor>,
}

impl ReportedReviews {
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn approved_count(&self) -> usize {
        self.approved.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

pub(crate) fn require_admin(role: Role) -> Result<(), AppError> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::forbidden(ADMIN_REQUIRED))
    }
}

pub struct ModerationWorkflow<'a> {
    restaurants: &'a dyn RestaurantStore,
    reviews: &'a dyn ReviewStore,
}

impl<'a> ModerationWorkflow<'a> {
    pub fn new(restaurants: &'a dyn RestaurantStore, reviews: &'a dyn ReviewStore) -> Self {
        Self {
            restaurants,
            reviews,
        }
    }

    /// Report or unreport, depending on the review's current flag. Only the owner of the
    /// review's restaurant may do either; a missing restaurant looks the same as someone else's.
    pub async fn toggle_report(
        &self,
        review_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(ModerationAction, Review), AppError> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or(AppError::NotFound("review"))?;

        if self
            .restaurants
            .find_owned(review.restaurant_id, actor_id)
            .await?
            .is_none()
        {
            warn!(%review_id, %actor_id, "report attempted by non-owner");
            return Err(AppError::forbidden(NOT_YOUR_RESTAURANT));
        }

        let action = ModerationAction::toggle_for(review.reported);
        let updated = self
            .reviews
            .apply_moderation(review_id, action.patch())
            .await?
            .ok_or(AppError::NotFound("review"))?;

        info!(
            %review_id,
            %actor_id,
            ?action,
            from = ?ModerationState::of(&review),
            to = ?ModerationState::of(&updated),
            "review report toggled"
        );
        Ok((action, updated))
    }

    /// Admin decision from a raw status string (`APPROVED`, `REJECTED` or `PENDING`).
    pub async fn set_status(
        &self,
        review_id: Uuid,
        status: &str,
        actor_role: Role,
    ) -> Result<ReviewWithAuthor, AppError> {
        require_admin(actor_role)?;
        match status.parse::<ReviewStatus>()? {
            ReviewStatus::Approved => self.approve(review_id, actor_role).await,
            ReviewStatus::Rejected => self.reject(review_id, actor_role).await,
            ReviewStatus::Pending => self.reset_to_pending(review_id, actor_role).await,
        }
    }

    pub async fn approve(&self, review_id: Uuid, actor_role: Role) -> Result<ReviewWithAuthor, AppError> {
        self.decide(review_id, ReviewStatus::Approved, actor_role).await
    }

    pub async fn reject(&self, review_id: Uuid, actor_role: Role) -> Result<ReviewWithAuthor, AppError> {
        self.decide(review_id, ReviewStatus::Rejected, actor_role).await
    }

    pub async fn reset_to_pending(
        &self,
        review_id: Uuid,
        actor_role: Role,
    ) -> Result<ReviewWithAuthor, AppError> {
        self.decide(review_id, ReviewStatus::Pending, actor_role).await
    }

    async fn decide(
        &self,
        review_id: Uuid,
        status: ReviewStatus,
        actor_role: Role,
    ) -> Result<ReviewWithAuthor, AppError> {
        require_admin(actor_role)?;
        let action = ModerationAction::SetStatus(status);
        self.reviews
            .apply_moderation(review_id, action.patch())
            .await?
            .ok_or(AppError::NotFound("review"))?;

        let review = self
            .reviews
            .find_with_author(review_id)
            .await?
            .ok_or(AppError::NotFound("review"))?;
        info!(%review_id, status = status.as_str(), "review status changed");
        Ok(review)
    }

    /// Read-only projection of reported reviews per status.
    pub async fn reported_reviews(&self, actor_role: Role) -> Result<ReportedReviews, AppError> {
        require_admin(actor_role)?;
        Ok(ReportedReviews {
            pending: self.reviews.list_reported(ReviewStatus::Pending).await?,
            approved: self.reviews.list_reported(ReviewStatus::Approved).await?,
            rejected: self.reviews.list_reported(ReviewStatus::Rejected).await?,
        })
    }
}
