pub mod aggregation_events;
pub mod aggregator;

pub use aggregation_events::AggregationEvents;
pub use aggregator::{PriorMeanRefresh, RatingAggregator, RecomputeOutcome, RecomputeSummary};
