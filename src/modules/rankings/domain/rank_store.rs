use async_trait::async_trait;
use std::sync::Arc;

use crate::modules::rankings::domain::rank_order::{RankCandidate, RankTable};
use crate::shared::errors::AppResult;

/// Port for the published rank table
///
/// Only the rank assigner publishes; every other component reads.
#[async_trait]
pub trait RankStore: Send + Sync {
    /// Consistent snapshot of ranking inputs for every item
    async fn rank_candidates(&self) -> AppResult<Vec<RankCandidate>>;

    /// Replace the current table in one step. On error the previous table stays current.
    async fn publish(&self, table: RankTable) -> AppResult<()>;

    async fn current(&self) -> AppResult<Arc<RankTable>>;
}
