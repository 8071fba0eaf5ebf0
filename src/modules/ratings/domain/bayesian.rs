use crate::modules::catalog::domain::{Rating, RatingAggregate};
use crate::shared::errors::{AppError, AppResult};

/// Bayesian smoothing prior: `C` virtual reviews at the global mean `m`.
///
/// `bayesian = (C*m + sum) / (C + n)`. Items with few reviews are pulled
/// towards `m`; as `n` grows the result converges to the raw average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesianPrior {
    weight: f64,
    mean: f64,
}

impl BayesianPrior {
    pub fn new(weight: f64, mean: f64) -> AppResult<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(AppError::ConfigError(format!(
                "prior weight must be positive, got {}",
                weight
            )));
        }
        if !mean.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "prior mean must be finite, got {}",
                mean
            )));
        }
        Ok(Self { weight, mean })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Aggregate fields for an item carrying exactly `ratings`.
    ///
    /// Sums are taken in integer tenths, so the result does not depend on the
    /// order ratings are read in and recomputing the same set is idempotent.
    pub fn aggregate(&self, ratings: &[Rating]) -> RatingAggregate {
        if ratings.is_empty() {
            return RatingAggregate::unrated(self.mean);
        }

        let tenths: u64 = ratings.iter().map(|r| u64::from(r.tenths())).sum();
        let count = ratings.len() as f64;
        let sum = tenths as f64 / 10.0;

        RatingAggregate {
            review_count: u32::try_from(ratings.len()).unwrap_or(u32::MAX),
            average_rating: sum / count,
            bayesian_rating: (self.weight * self.mean + sum) / (self.weight + count),
        }
    }
}

/// Mean `averageRating` over rated items, `None` when nothing is rated yet
pub fn global_mean(rated_averages: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = rated_averages
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(values: &[f64]) -> Vec<Rating> {
        values.iter().map(|v| Rating::new(*v).unwrap()).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn worked_example_matches_formula() {
        let prior = BayesianPrior::new(10.0, 6.5).unwrap();
        let aggregate = prior.aggregate(&ratings(&[8.0, 9.0, 7.0]));

        assert_eq!(aggregate.review_count, 3);
        assert!(close(aggregate.average_rating, 8.0));
        assert!(close(aggregate.bayesian_rating, 89.0 / 13.0));
    }

    #[test]
    fn no_reviews_sits_at_the_prior() {
        let prior = BayesianPrior::new(10.0, 6.5).unwrap();
        let aggregate = prior.aggregate(&[]);

        assert_eq!(aggregate.review_count, 0);
        assert_eq!(aggregate.average_rating, 0.0);
        assert_eq!(aggregate.bayesian_rating, 6.5);
    }

    #[test]
    fn converges_monotonically_to_the_raw_average() {
        let prior = BayesianPrior::new(10.0, 5.0).unwrap();
        let mut previous_gap = f64::INFINITY;

        for n in [1usize, 2, 5, 10, 50, 200, 1000] {
            let aggregate = prior.aggregate(&ratings(&vec![9.0; n]));
            let gap = (aggregate.average_rating - aggregate.bayesian_rating).abs();
            assert!(gap < previous_gap, "gap did not shrink at n={}", n);
            previous_gap = gap;
        }
        assert!(previous_gap < 0.05);
    }

    #[test]
    fn order_of_ratings_does_not_matter() {
        let prior = BayesianPrior::new(10.0, 6.0).unwrap();
        let forward = prior.aggregate(&ratings(&[1.1, 9.7, 4.3, 6.6]));
        let backward = prior.aggregate(&ratings(&[6.6, 4.3, 9.7, 1.1]));
        assert_eq!(forward, backward);
    }

    #[test]
    fn rejects_non_positive_weight() {
        assert!(BayesianPrior::new(0.0, 6.0).is_err());
        assert!(BayesianPrior::new(-1.0, 6.0).is_err());
        assert!(BayesianPrior::new(10.0, f64::NAN).is_err());
    }

    #[test]
    fn global_mean_ignores_nothing_rated() {
        assert_eq!(global_mean(&[]), None);
        assert!(close(global_mean(&[6.0, 8.0]).unwrap(), 7.0));
    }
}
