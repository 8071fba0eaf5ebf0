use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::catalog::domain::{
    Item, ItemRepository, Rating, RatingAggregate, Review, ReviewRepository,
};
use crate::modules::rankings::domain::{RankCandidate, RankStore, RankTable};
use crate::shared::errors::{AppError, AppResult};

/// Process-local store for items, reviews and the published rank table
///
/// Each item entry is replaced atomically, so a snapshot never sees half of an
/// aggregate update. The rank table is an `Arc` swapped under a short write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: DashMap<Uuid, Item>,
    reviews: DashMap<Uuid, HashMap<Uuid, Review>>,
    review_items: DashMap<Uuid, Uuid>,
    ranks: RwLock<Arc<RankTable>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn review_count(&self) -> usize {
        self.review_items.len()
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn insert(&self, item: Item) -> AppResult<()> {
        self.items.insert(item.id, item);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Item>> {
        Ok(self.items.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Item>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.items.iter().map(|entry| *entry.key()).collect())
    }

    async fn save_aggregate(&self, id: Uuid, aggregate: RatingAggregate) -> AppResult<bool> {
        match self.items.get_mut(&id) {
            Some(mut item) => {
                item.aggregate = aggregate;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rated_averages(&self) -> AppResult<Vec<f64>> {
        Ok(self
            .items
            .iter()
            .filter(|entry| entry.aggregate.is_rated())
            .map(|entry| entry.aggregate.average_rating)
            .collect())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn insert(&self, review: Review) -> AppResult<()> {
        if !self.items.contains_key(&review.item_id) {
            return Err(AppError::NotFound(format!("item {}", review.item_id)));
        }
        if self.review_items.contains_key(&review.id) {
            return Err(AppError::InvalidInput(format!(
                "review {} already exists",
                review.id
            )));
        }

        self.review_items.insert(review.id, review.item_id);
        self.reviews
            .entry(review.item_id)
            .or_default()
            .insert(review.id, review);
        Ok(())
    }

    async fn update(&self, review: Review) -> AppResult<()> {
        let item_id = self
            .review_items
            .get(&review.id)
            .map(|entry| *entry.value())
            .ok_or_else(|| AppError::NotFound(format!("review {}", review.id)))?;

        if item_id != review.item_id {
            return Err(AppError::InvalidInput(format!(
                "review {} cannot move to another item",
                review.id
            )));
        }

        let mut reviews = self
            .reviews
            .get_mut(&item_id)
            .ok_or_else(|| AppError::NotFound(format!("review {}", review.id)))?;
        reviews.insert(review.id, review);
        Ok(())
    }

    async fn delete(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        let Some((_, item_id)) = self.review_items.remove(&review_id) else {
            return Ok(None);
        };

        let removed = self
            .reviews
            .get_mut(&item_id)
            .and_then(|mut reviews| reviews.remove(&review_id));
        Ok(removed)
    }

    async fn find_by_id(&self, review_id: Uuid) -> AppResult<Option<Review>> {
        let Some(item_id) = self.review_items.get(&review_id).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self
            .reviews
            .get(&item_id)
            .and_then(|reviews| reviews.get(&review_id).cloned()))
    }

    async fn ratings_for_item(&self, item_id: Uuid) -> AppResult<Vec<Rating>> {
        Ok(self
            .reviews
            .get(&item_id)
            .map(|reviews| reviews.values().map(|review| review.rating).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RankStore for InMemoryStore {
    async fn rank_candidates(&self) -> AppResult<Vec<RankCandidate>> {
        Ok(self
            .items
            .iter()
            .map(|entry| RankCandidate {
                item_id: entry.id,
                bayesian_rating: entry.aggregate.bayesian_rating,
                review_count: entry.aggregate.review_count,
            })
            .collect())
    }

    async fn publish(&self, table: RankTable) -> AppResult<()> {
        *self.ranks.write().await = Arc::new(table);
        Ok(())
    }

    async fn current(&self) -> AppResult<Arc<RankTable>> {
        Ok(self.ranks.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::domain::ItemAttributes;

    fn item() -> Item {
        Item::new(
            Uuid::new_v4(),
            ItemAttributes::new("Tomb of Horrors", "fantasy", "adventure"),
            5.5,
        )
    }

    #[tokio::test]
    async fn reviews_are_indexed_per_item() {
        let store = InMemoryStore::new();
        let item = item();
        ItemRepository::insert(&store, item.clone()).await.unwrap();

        let review = Review::new(item.id, Uuid::new_v4(), Rating::new(8.0).unwrap(), "deadly");
        ReviewRepository::insert(&store, review.clone()).await.unwrap();

        let ratings = store.ratings_for_item(item.id).await.unwrap();
        assert_eq!(ratings, vec![Rating::new(8.0).unwrap()]);

        let removed = store.delete(review.id).await.unwrap();
        assert_eq!(removed.map(|r| r.id), Some(review.id));
        assert!(store.ratings_for_item(item.id).await.unwrap().is_empty());
        assert_eq!(store.delete(review.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn review_for_unknown_item_is_rejected() {
        let store = InMemoryStore::new();
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), Rating::new(5.0).unwrap(), "");
        let result = ReviewRepository::insert(&store, review).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn updating_unknown_review_is_not_found() {
        let store = InMemoryStore::new();
        let review = Review::new(Uuid::new_v4(), Uuid::new_v4(), Rating::new(5.0).unwrap(), "");
        assert!(matches!(store.update(review).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_aggregate_reports_missing_items() {
        let store = InMemoryStore::new();
        let aggregate = RatingAggregate::unrated(5.5);
        assert!(!store.save_aggregate(Uuid::new_v4(), aggregate).await.unwrap());
    }

    #[tokio::test]
    async fn publish_swaps_the_whole_table() {
        let store = InMemoryStore::new();
        assert_eq!(store.current().await.unwrap().generation(), 0);

        let id = Uuid::new_v4();
        store
            .publish(RankTable::from_ordered(1, vec![id]).unwrap())
            .await
            .unwrap();

        let table = store.current().await.unwrap();
        assert_eq!(table.generation(), 1);
        assert_eq!(table.position(&id), Some(1));
    }
}
