use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::modules::catalog::domain::{ItemRepository, Rating, Review, ReviewRepository};
use crate::modules::jobs::{Job, JobRepository};
use crate::shared::{
    application::use_case::UseCase,
    errors::{AppError, AppResult},
};
use crate::{log_debug, log_error};

use super::{
    command::ReviewCommand,
    result::{ReviewAction, ReviewCommandResult},
};

/// Write path for review changes.
///
/// Persists the review, then queues a recompute for the owning item. The
/// aggregate itself is never touched here.
pub struct ReviewService {
    items: Arc<dyn ItemRepository>,
    reviews: Arc<dyn ReviewRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl ReviewService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        reviews: Arc<dyn ReviewRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            items,
            reviews,
            jobs,
        }
    }

    /// Queue a recompute for an item without a review write, as sent by the
    /// review-changed hook.
    pub async fn notify_changed(&self, item_id: Uuid) -> AppResult<Uuid> {
        if self.items.find_by_id(item_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Item {} not found", item_id)));
        }
        let record = self.jobs.enqueue(Job::recompute(item_id)).await?;
        Ok(record.id)
    }

    async fn submit(
        &self,
        item_id: Uuid,
        reviewer_id: Uuid,
        rating: f64,
        body: String,
    ) -> AppResult<ReviewCommandResult> {
        let rating = Rating::new(rating)?;

        if self.items.find_by_id(item_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Item {} not found", item_id)));
        }

        let review = Review::new(item_id, reviewer_id, rating, body);
        let review_id = review.id;
        self.reviews.insert(review).await?;

        Ok(self
            .queue_recompute(review_id, item_id, ReviewAction::Created)
            .await)
    }

    async fn edit(
        &self,
        review_id: Uuid,
        rating: Option<f64>,
        body: Option<String>,
    ) -> AppResult<ReviewCommandResult> {
        let rating = rating.map(Rating::new).transpose()?;

        let Some(mut review) = self.reviews.find_by_id(review_id).await? else {
            return Err(AppError::NotFound(format!("Review {} not found", review_id)));
        };
        let item_id = review.item_id;

        if !review.revise(rating, body) {
            log_debug!(review_id = %review_id, "Review edit changed nothing");
            return Ok(ReviewCommandResult {
                review_id,
                item_id,
                action: ReviewAction::Unchanged,
                recompute_queued: false,
                job_id: None,
            });
        }

        self.reviews.update(review).await?;

        Ok(self
            .queue_recompute(review_id, item_id, ReviewAction::Updated)
            .await)
    }

    async fn delete(&self, review_id: Uuid) -> AppResult<ReviewCommandResult> {
        let Some(review) = self.reviews.delete(review_id).await? else {
            return Err(AppError::NotFound(format!("Review {} not found", review_id)));
        };

        Ok(self
            .queue_recompute(review_id, review.item_id, ReviewAction::Deleted)
            .await)
    }

    /// The review write has already happened, so an enqueue failure is only logged.
    async fn queue_recompute(
        &self,
        review_id: Uuid,
        item_id: Uuid,
        action: ReviewAction,
    ) -> ReviewCommandResult {
        let job_id = match self.jobs.enqueue(Job::recompute(item_id)).await {
            Ok(record) => Some(record.id),
            Err(e) => {
                log_error!(
                    item_id = %item_id,
                    review_id = %review_id,
                    error = %e,
                    "Failed to queue rating recompute"
                );
                None
            }
        };

        ReviewCommandResult {
            review_id,
            item_id,
            action,
            recompute_queued: job_id.is_some(),
            job_id,
        }
    }
}

#[async_trait]
impl UseCase<ReviewCommand, ReviewCommandResult> for ReviewService {
    async fn execute(&self, command: ReviewCommand) -> AppResult<ReviewCommandResult> {
        match command {
            ReviewCommand::Submit {
                item_id,
                reviewer_id,
                rating,
                body,
            } => self.submit(item_id, reviewer_id, rating, body).await,
            ReviewCommand::Edit {
                review_id,
                rating,
                body,
            } => self.edit(review_id, rating, body).await,
            ReviewCommand::Delete { review_id } => self.delete(review_id).await,
        }
    }
}
