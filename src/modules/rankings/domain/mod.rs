pub mod category_index;
pub mod rank_order;
pub mod rank_store;
pub mod taxonomy;

pub use category_index::{CategoryFilter, CategoryIndex, CategorySummary, SubcategorySummary};
pub use rank_order::{compare_candidates, order_candidates, RankCandidate, RankTable};
pub use rank_store::RankStore;
pub use taxonomy::{Category, Predicate, Subcategory, Taxonomy, OVERALL};
