pub mod query_service;
pub mod rank_assigner;

pub use query_service::{RankedPage, RankingQuery, RankingQueryService};
pub use rank_assigner::{RankAssigner, ReassignmentSummary};
