use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::modules::rankings::domain::{order_candidates, RankStore, RankTable};
use crate::modules::ratings::application::AggregationEvents;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::TimedOperation;
use crate::{log_error, log_info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentSummary {
    pub generation: u64,
    pub ranked_count: usize,
    pub unranked_count: usize,
    /// Aggregation events folded into this reassignment
    pub events_applied: u64,
    pub duration_ms: u64,
    pub computed_at: DateTime<Utc>,
}

/// Sole writer of rank positions.
///
/// Builds a complete table from one snapshot and publishes it in a single
/// step. Runs are serialized so generations strictly increase.
pub struct RankAssigner {
    store: Arc<dyn RankStore>,
    events: Arc<AggregationEvents>,
    run_lock: Mutex<()>,
}

impl RankAssigner {
    pub fn new(store: Arc<dyn RankStore>, events: Arc<AggregationEvents>) -> Self {
        Self {
            store,
            events,
            run_lock: Mutex::new(()),
        }
    }

    pub async fn reassign_all(&self) -> AppResult<ReassignmentSummary> {
        let _guard = self.run_lock.lock().await;
        let timer = TimedOperation::new("reassign_all");
        let events_applied = self.events.take();

        match self.build_and_publish().await {
            Ok((table, total)) => {
                let summary = ReassignmentSummary {
                    generation: table.generation(),
                    ranked_count: table.len(),
                    unranked_count: total - table.len(),
                    events_applied,
                    duration_ms: timer.elapsed().as_millis() as u64,
                    computed_at: table.computed_at(),
                };
                timer.finish_with_info(&format!(
                    "generation {}, {} ranked",
                    summary.generation, summary.ranked_count
                ));
                log_info!(
                    generation = summary.generation,
                    ranked = summary.ranked_count,
                    unranked = summary.unranked_count,
                    "Rank table published"
                );
                Ok(summary)
            }
            Err(e) => {
                // The previous table stays published; keep the events for the next run
                self.events.restore(events_applied);
                log_error!(error = %e, "Rank reassignment failed");
                Err(e)
            }
        }
    }

    async fn build_and_publish(&self) -> AppResult<(RankTable, usize)> {
        let candidates = self
            .store
            .rank_candidates()
            .await
            .map_err(|e| AppError::ReassignmentFailed(format!("snapshot failed: {}", e)))?;
        let total = candidates.len();

        let ordered = order_candidates(candidates)?;
        let generation = self
            .store
            .current()
            .await
            .map_err(|e| AppError::ReassignmentFailed(format!("cannot read current table: {}", e)))?
            .generation()
            + 1;
        let table = RankTable::from_ordered(generation, ordered)?;

        self.store
            .publish(table.clone())
            .await
            .map_err(|e| AppError::ReassignmentFailed(format!("publication failed: {}", e)))?;

        Ok((table, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::rankings::domain::RankCandidate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    struct FixedStore {
        candidates: Vec<RankCandidate>,
        table: tokio::sync::RwLock<Arc<RankTable>>,
        fail_publish: AtomicBool,
    }

    #[async_trait]
    impl RankStore for FixedStore {
        async fn rank_candidates(&self) -> AppResult<Vec<RankCandidate>> {
            Ok(self.candidates.clone())
        }

        async fn publish(&self, table: RankTable) -> AppResult<()> {
            if self.fail_publish.load(Ordering::SeqCst) {
                return Err(AppError::DatabaseError("connection lost".to_string()));
            }
            *self.table.write().await = Arc::new(table);
            Ok(())
        }

        async fn current(&self) -> AppResult<Arc<RankTable>> {
            Ok(self.table.read().await.clone())
        }
    }

    fn store(candidates: Vec<RankCandidate>) -> Arc<FixedStore> {
        Arc::new(FixedStore {
            candidates,
            table: tokio::sync::RwLock::new(Arc::new(RankTable::empty())),
            fail_publish: AtomicBool::new(false),
        })
    }

    fn candidate(id: u128, bayesian: f64, count: u32) -> RankCandidate {
        RankCandidate {
            item_id: Uuid::from_u128(id),
            bayesian_rating: bayesian,
            review_count: count,
        }
    }

    #[tokio::test]
    async fn assigns_dense_positions_to_rated_items() {
        let store = store(vec![
            candidate(1, 6.0, 2),
            candidate(2, 7.0, 4),
            candidate(3, 5.5, 0),
            candidate(4, 6.0, 5),
        ]);
        let events = Arc::new(AggregationEvents::new(10));
        events.record();
        let assigner = RankAssigner::new(store.clone(), events.clone());

        let summary = assigner.reassign_all().await.unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.ranked_count, 3);
        assert_eq!(summary.unranked_count, 1);
        assert_eq!(summary.events_applied, 1);
        assert_eq!(events.pending(), 0);

        let table = store.current().await.unwrap();
        assert_eq!(table.position(&Uuid::from_u128(2)), Some(1));
        assert_eq!(table.position(&Uuid::from_u128(4)), Some(2));
        assert_eq!(table.position(&Uuid::from_u128(1)), Some(3));
        assert_eq!(table.position(&Uuid::from_u128(3)), None);
    }

    #[tokio::test]
    async fn failed_publication_keeps_previous_table() {
        let store = store(vec![candidate(1, 6.0, 2)]);
        let events = Arc::new(AggregationEvents::new(10));
        let assigner = RankAssigner::new(store.clone(), events.clone());
        assigner.reassign_all().await.unwrap();

        store.fail_publish.store(true, Ordering::SeqCst);
        events.record();
        let result = assigner.reassign_all().await;

        assert!(matches!(result, Err(AppError::ReassignmentFailed(_))));
        assert_eq!(store.current().await.unwrap().generation(), 1);
        assert_eq!(events.pending(), 1);
    }

    #[tokio::test]
    async fn non_finite_rating_aborts_without_publishing() {
        let store = store(vec![candidate(1, f64::INFINITY, 2)]);
        let assigner = RankAssigner::new(store.clone(), Arc::new(AggregationEvents::new(0)));

        assert!(assigner.reassign_all().await.is_err());
        assert_eq!(store.current().await.unwrap().generation(), 0);
    }
}
