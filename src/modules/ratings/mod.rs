/// Rating aggregation
///
/// Turns the reviews attached to an item into its review count, raw average
/// and Bayesian-smoothed rating.
pub mod application;
pub mod domain;

pub use application::{AggregationEvents, RatingAggregator, RecomputeOutcome};
pub use domain::BayesianPrior;
