use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use crate::modules::catalog::domain::{
    Item, ItemAttributes, ItemRepository, Rating, Review, ReviewRepository,
};
use crate::shared::errors::{AppError, AppResult};
use crate::{log_info, log_warn};

/// Development fixture of items and reviews
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub items: Vec<SeedItem>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub attributes: ItemAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReview {
    pub item_id: Uuid,
    #[serde(default = "Uuid::new_v4")]
    pub reviewer_id: Uuid,
    pub rating: f64,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub items: usize,
    pub reviews: usize,
    pub skipped: Vec<String>,
}

impl SeedData {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::ConfigError(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Insert items then reviews. Invalid reviews are skipped and reported, not fatal.
    pub async fn apply(
        self,
        items: &dyn ItemRepository,
        reviews: &dyn ReviewRepository,
        prior_mean: f64,
    ) -> AppResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for seed in self.items {
            items
                .insert(Item::new(seed.id, seed.attributes, prior_mean))
                .await?;
            summary.items += 1;
        }

        for seed in self.reviews {
            let rating = match Rating::new(seed.rating) {
                Ok(rating) => rating,
                Err(e) => {
                    log_warn!(item_id = %seed.item_id, "Skipping seed review: {}", e);
                    summary.skipped.push(format!("{}: {}", seed.item_id, e));
                    continue;
                }
            };

            let review = Review::new(seed.item_id, seed.reviewer_id, rating, seed.body);
            match reviews.insert(review).await {
                Ok(()) => summary.reviews += 1,
                Err(AppError::NotFound(what)) => {
                    log_warn!(item_id = %seed.item_id, "Skipping seed review for unknown {}", what);
                    summary.skipped.push(format!("{}: unknown item", seed.item_id));
                }
                Err(e) => return Err(e),
            }
        }

        log_info!(
            "Seeded {} items and {} reviews ({} skipped)",
            summary.items,
            summary.reviews,
            summary.skipped.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::infrastructure::InMemoryStore;

    const FIXTURE: &str = r#"{
        "items": [
            {"id": "00000000-0000-0000-0000-000000000001", "title": "Dungeon", "genre": "fantasy", "type": "adventure", "adventureType": "module"}
        ],
        "reviews": [
            {"itemId": "00000000-0000-0000-0000-000000000001", "rating": 8.5, "body": "great"},
            {"itemId": "00000000-0000-0000-0000-000000000001", "rating": 11},
            {"itemId": "00000000-0000-0000-0000-000000000009", "rating": 7}
        ]
    }"#;

    #[tokio::test]
    async fn applies_fixture_and_skips_bad_reviews() {
        let store = InMemoryStore::new();
        let seed = SeedData::from_json(FIXTURE).unwrap();

        let summary = seed.apply(&store, &store, 5.5).await.unwrap();

        assert_eq!(summary.items, 1);
        assert_eq!(summary.reviews, 1);
        assert_eq!(summary.skipped.len(), 2);

        let item = ItemRepository::find_by_id(&store, Uuid::from_u128(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.attributes.adventure_type.as_deref(), Some("module"));
        assert_eq!(item.aggregate.bayesian_rating, 5.5);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            SeedData::from_json("{items: nope}"),
            Err(AppError::SerializationError(_))
        ));
    }
}
