use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use super::worker::{BackgroundWorker, WorkerStatistics};
use crate::modules::rankings::application::{RankAssigner, ReassignmentSummary};
use crate::modules::ratings::{RatingAggregator, RecomputeOutcome};
use crate::shared::errors::ApiError;

/// Run a full rank reassignment now instead of waiting for the maintenance cycle
pub async fn reassign_ranks(
    State(assigner): State<Arc<RankAssigner>>,
) -> Result<Json<ReassignmentSummary>, ApiError> {
    Ok(Json(assigner.reassign_all().await?))
}

pub async fn recompute_item(
    Path(item_id): Path<String>,
    State(aggregator): State<Arc<RatingAggregator>>,
) -> Result<Json<RecomputeOutcome>, ApiError> {
    let item_id = ApiError::parse_id(&item_id, "item")?;
    Ok(Json(aggregator.recompute(item_id).await?))
}

pub async fn get_worker_statistics(
    State(worker): State<Arc<BackgroundWorker>>,
) -> Result<Json<WorkerStatistics>, ApiError> {
    Ok(Json(worker.get_statistics().await?))
}
