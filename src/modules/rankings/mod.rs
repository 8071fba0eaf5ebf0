/// Rank assignment, category filtering and paginated ranking queries
pub mod application;
pub mod commands;
pub mod domain;
pub mod infrastructure;

pub use application::{RankAssigner, RankedPage, RankingQuery, RankingQueryService};
pub use domain::{CategoryIndex, RankStore, RankTable, Taxonomy};
