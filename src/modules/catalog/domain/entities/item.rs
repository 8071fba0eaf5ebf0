use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::catalog::domain::value_objects::{ItemAttributes, RatingAggregate};

/// A rankable catalog entry (adventure, rulebook, supplement, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    #[serde(flatten)]
    pub attributes: ItemAttributes,
    #[serde(flatten)]
    pub aggregate: RatingAggregate,
}

impl Item {
    pub fn new(id: Uuid, attributes: ItemAttributes, prior_mean: f64) -> Self {
        Self {
            id,
            attributes,
            aggregate: RatingAggregate::unrated(prior_mean),
        }
    }

    /// Display record joined with the currently published rank position
    pub fn view(&self, rank_position: Option<u32>, trusted_review_threshold: u32) -> ItemView {
        ItemView {
            id: self.id,
            attributes: self.attributes.clone(),
            review_count: self.aggregate.review_count,
            average_rating: self.aggregate.average_rating,
            bayesian_rating: self.aggregate.bayesian_rating,
            rank_position,
            rating_trusted: self.aggregate.review_count >= trusted_review_threshold,
        }
    }
}

/// Item as produced to the page-rendering collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: Uuid,
    #[serde(flatten)]
    pub attributes: ItemAttributes,
    pub review_count: u32,
    pub average_rating: f64,
    pub bayesian_rating: f64,
    pub rank_position: Option<u32>,
    /// Whether enough reviews exist for the raw average to be shown as authoritative
    pub rating_trusted: bool,
}
