use serde::{Deserialize, Serialize};

/// The aggregate fields the rating subsystem maintains on an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub review_count: u32,
    /// Arithmetic mean of attached ratings, 0 when there are none
    pub average_rating: f64,
    pub bayesian_rating: f64,
}

impl RatingAggregate {
    /// State of an item nobody has reviewed: no raw data, Bayesian rating at the prior.
    pub fn unrated(prior_mean: f64) -> Self {
        Self {
            review_count: 0,
            average_rating: 0.0,
            bayesian_rating: prior_mean,
        }
    }

    pub fn is_rated(&self) -> bool {
        self.review_count > 0
    }
}
