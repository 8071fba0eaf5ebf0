use async_trait::async_trait;
use uuid::Uuid;

use crate::modules::catalog::domain::{Item, Rating, RatingAggregate, Review};
use crate::shared::errors::AppResult;

/// Port for item persistence
///
/// Descriptive attributes are written by the catalog collaborator; the rating
/// subsystem only ever writes the aggregate through `save_aggregate`.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn insert(&self, item: Item) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>>;

    /// Items for the given ids; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Item>>;

    async fn list_ids(&self) -> AppResult<Vec<Uuid>>;

    /// Overwrite the aggregate fields. Returns `false` when the item does not exist.
    async fn save_aggregate(&self, id: Uuid, aggregate: RatingAggregate) -> AppResult<bool>;

    /// `averageRating` of every item with at least one review
    async fn rated_averages(&self) -> AppResult<Vec<f64>>;
}

/// Port for review persistence, owned by the review-management collaborator
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert(&self, review: Review) -> AppResult<()>;

    /// Replace an existing review. Fails with `NotFound` for unknown ids.
    async fn update(&self, review: Review) -> AppResult<()>;

    /// Remove a review, returning it when it existed
    async fn delete(&self, review_id: Uuid) -> AppResult<Option<Review>>;

    async fn find_by_id(&self, review_id: Uuid) -> AppResult<Option<Review>>;

    /// Every rating currently attached to an item
    async fn ratings_for_item(&self, item_id: Uuid) -> AppResult<Vec<Rating>>;
}
