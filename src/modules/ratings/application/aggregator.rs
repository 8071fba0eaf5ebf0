use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::modules::catalog::domain::{ItemRepository, RatingAggregate, ReviewRepository};
use crate::modules::ratings::application::aggregation_events::AggregationEvents;
use crate::modules::ratings::domain::{global_mean, BayesianPrior, PriorMeanCache};
use crate::shared::config::RatingConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::TimedOperation;
use crate::shared::utils::retry::{RetryConfig, RetryUtil};
use crate::{log_debug, log_info, log_warn};

const RECOMPUTE_ALL_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RecomputeOutcome {
    Updated(RatingAggregate),
    /// The item no longer exists
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeSummary {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RecomputeSummary {
    fn from_outcomes(outcomes: Vec<AppResult<Option<RecomputeOutcome>>>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                Ok(Some(RecomputeOutcome::Updated(_))) => summary.updated += 1,
                Ok(Some(RecomputeOutcome::Skipped)) => summary.skipped += 1,
                Ok(None) => {}
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorMeanRefresh {
    pub previous: Option<f64>,
    pub current: f64,
}

impl PriorMeanRefresh {
    pub fn moved(&self) -> bool {
        self.previous.map_or(true, |previous| (previous - self.current).abs() > f64::EPSILON)
    }
}

/// Maintains the per-item aggregate fields from the attached reviews.
///
/// Recomputes of the same item are serialized; different items run in parallel.
pub struct RatingAggregator {
    items: Arc<dyn ItemRepository>,
    reviews: Arc<dyn ReviewRepository>,
    prior_weight: f64,
    prior_mean: PriorMeanCache,
    retry: RetryConfig,
    events: Arc<AggregationEvents>,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl RatingAggregator {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        reviews: Arc<dyn ReviewRepository>,
        config: &RatingConfig,
        retry: RetryConfig,
        events: Arc<AggregationEvents>,
    ) -> Self {
        Self {
            items,
            reviews,
            prior_weight: config.prior_weight,
            prior_mean: PriorMeanCache::new(config.prior_mean_ttl, config.default_prior_mean),
            retry,
            events,
            locks: DashMap::new(),
        }
    }

    pub fn events(&self) -> &Arc<AggregationEvents> {
        &self.events
    }

    /// Recompute one item's aggregate from its current reviews.
    ///
    /// Transient store failures are retried with backoff and end as
    /// `AggregationFailed` for this item only. A missing item is a logged no-op.
    pub async fn recompute(&self, item_id: Uuid) -> AppResult<RecomputeOutcome> {
        self.recompute_item(item_id, true).await
    }

    /// `count_event` is false for batch recomputes that a reassignment follows directly.
    async fn recompute_item(
        &self,
        item_id: Uuid,
        count_event: bool,
    ) -> AppResult<RecomputeOutcome> {
        let lock = self
            .locks
            .entry(item_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            RetryUtil::with_retry(
                || self.recompute_locked(item_id),
                &self.retry,
                "recompute_rating",
            )
            .await
        };

        drop(lock);
        self.locks
            .remove_if(&item_id, |_, lock| Arc::strong_count(lock) == 1);

        match &outcome {
            Ok(RecomputeOutcome::Updated(aggregate)) => {
                if count_event {
                    self.events.record();
                }
                log_debug!(
                    item_id = %item_id,
                    review_count = aggregate.review_count,
                    bayesian_rating = aggregate.bayesian_rating,
                    "Rating recomputed"
                );
            }
            Ok(RecomputeOutcome::Skipped) => {
                log_warn!(item_id = %item_id, "Recompute skipped: item not found");
            }
            Err(e) => {
                log_warn!(item_id = %item_id, error = %e, "Recompute failed");
            }
        }

        outcome
    }

    async fn recompute_locked(&self, item_id: Uuid) -> AppResult<RecomputeOutcome> {
        let failed = |e: AppError| AppError::aggregation_failed(item_id, e.to_string());

        if self.items.find_by_id(item_id).await.map_err(failed)?.is_none() {
            return Ok(RecomputeOutcome::Skipped);
        }

        let ratings = self
            .reviews
            .ratings_for_item(item_id)
            .await
            .map_err(failed)?;
        let mean = self.prior_mean().await.map_err(failed)?;
        let aggregate = BayesianPrior::new(self.prior_weight, mean)?.aggregate(&ratings);

        if !self
            .items
            .save_aggregate(item_id, aggregate)
            .await
            .map_err(failed)?
        {
            return Ok(RecomputeOutcome::Skipped);
        }

        Ok(RecomputeOutcome::Updated(aggregate))
    }

    /// Recompute every item; individual failures are counted, never fatal.
    pub async fn recompute_all(&self) -> AppResult<RecomputeSummary> {
        let timer = TimedOperation::new("recompute_all");
        let ids = self.items.list_ids().await?;

        let outcomes: Vec<AppResult<Option<RecomputeOutcome>>> = stream::iter(ids)
            .map(|id| async move { self.recompute_item(id, false).await.map(Some) })
            .buffer_unordered(RECOMPUTE_ALL_CONCURRENCY)
            .collect()
            .await;

        let summary = RecomputeSummary::from_outcomes(outcomes);
        timer.finish_with_info(&format!(
            "{} updated, {} skipped, {} failed",
            summary.updated, summary.skipped, summary.failed
        ));
        Ok(summary)
    }

    /// Recompute only the items whose stored aggregate no longer matches their
    /// reviews.
    ///
    /// Reviews are the durable record, so this catches every recompute that was
    /// never delivered: a failed enqueue or a job that ran out of attempts.
    pub async fn reconcile_all(&self) -> AppResult<RecomputeSummary> {
        let timer = TimedOperation::new("reconcile_all");
        let ids = self.items.list_ids().await?;

        let outcomes: Vec<AppResult<Option<RecomputeOutcome>>> = stream::iter(ids)
            .map(|id| self.reconcile(id))
            .buffer_unordered(RECOMPUTE_ALL_CONCURRENCY)
            .collect()
            .await;

        let summary = RecomputeSummary::from_outcomes(outcomes);
        timer.finish_with_info(&format!(
            "{} stale aggregates fixed, {} failed",
            summary.updated, summary.failed
        ));
        Ok(summary)
    }

    /// `None` when the stored aggregate is already current
    async fn reconcile(&self, item_id: Uuid) -> AppResult<Option<RecomputeOutcome>> {
        let Some(item) = self.items.find_by_id(item_id).await? else {
            return Ok(None);
        };
        let ratings = self.reviews.ratings_for_item(item_id).await?;
        let expected = BayesianPrior::new(self.prior_weight, self.prior_mean().await?)?
            .aggregate(&ratings);

        if item.aggregate == expected {
            return Ok(None);
        }

        log_info!(
            item_id = %item_id,
            stored_count = item.aggregate.review_count,
            review_count = expected.review_count,
            "Stale aggregate found, recomputing"
        );
        self.recompute_item(item_id, false).await.map(Some)
    }

    /// Current global prior mean, refreshed when the cached value is stale
    pub async fn prior_mean(&self) -> AppResult<f64> {
        if let Some(mean) = self.prior_mean.fresh().await {
            return Ok(mean);
        }
        Ok(self.refresh_prior_mean().await?.current)
    }

    /// Recompute `m` from every rated item's average
    pub async fn refresh_prior_mean(&self) -> AppResult<PriorMeanRefresh> {
        let averages = self.items.rated_averages().await?;
        let (previous, current) = self.prior_mean.store(global_mean(&averages)).await;

        if previous != Some(current) {
            log_info!(
                rated_items = averages.len(),
                "Prior mean refreshed: {:?} -> {:.4}",
                previous,
                current
            );
        }
        Ok(PriorMeanRefresh { previous, current })
    }

    /// Last known prior mean without touching the store
    pub async fn cached_prior_mean(&self) -> f64 {
        self.prior_mean.current().await
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::domain::{Item, ItemAttributes, Rating, Review};
    use crate::modules::catalog::infrastructure::InMemoryStore;

    fn aggregator(store: &Arc<InMemoryStore>) -> RatingAggregator {
        RatingAggregator::new(
            store.clone(),
            store.clone(),
            &RatingConfig::default(),
            RetryConfig::immediate(2),
            Arc::new(AggregationEvents::new(10)),
        )
    }

    async fn seed_item(store: &InMemoryStore, ratings: &[f64]) -> Uuid {
        let item = Item::new(
            Uuid::new_v4(),
            ItemAttributes::new("Keep on the Borderlands", "fantasy", "adventure"),
            5.5,
        );
        let id = item.id;
        ItemRepository::insert(store, item).await.unwrap();
        for rating in ratings {
            let review = Review::new(id, Uuid::new_v4(), Rating::new(*rating).unwrap(), "");
            ReviewRepository::insert(store, review).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn recompute_writes_aggregate_and_counts_event() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);
        let id = seed_item(&store, &[8.0, 9.0, 7.0]).await;

        let outcome = aggregator.recompute(id).await.unwrap();

        let RecomputeOutcome::Updated(aggregate) = outcome else {
            panic!("expected an update");
        };
        assert_eq!(aggregate.review_count, 3);
        assert!((aggregate.average_rating - 8.0).abs() < 1e-9);
        // Prior mean is the default before anything was rated
        assert!((aggregate.bayesian_rating - (10.0 * 5.5 + 24.0) / 13.0).abs() < 1e-9);
        assert_eq!(aggregator.events().pending(), 1);
        assert_eq!(aggregator.lock_entries(), 0);

        let stored = ItemRepository::find_by_id(store.as_ref(), id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.aggregate, aggregate);
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);
        let id = seed_item(&store, &[6.5, 7.2]).await;

        let first = aggregator.recompute(id).await.unwrap();
        let second = aggregator.recompute(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_item_is_skipped() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);

        let outcome = aggregator.recompute(Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome, RecomputeOutcome::Skipped);
        assert_eq!(aggregator.events().pending(), 0);
    }

    #[tokio::test]
    async fn prior_mean_falls_back_then_follows_rated_items() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);
        assert_eq!(aggregator.prior_mean().await.unwrap(), 5.5);

        let a = seed_item(&store, &[8.0]).await;
        let b = seed_item(&store, &[6.0]).await;
        aggregator.recompute(a).await.unwrap();
        aggregator.recompute(b).await.unwrap();

        let refresh = aggregator.refresh_prior_mean().await.unwrap();
        assert_eq!(refresh.previous, Some(5.5));
        assert!((refresh.current - 7.0).abs() < 1e-9);
        assert!(refresh.moved());
    }

    #[tokio::test]
    async fn recompute_all_counts_every_item() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);
        seed_item(&store, &[5.0]).await;
        seed_item(&store, &[]).await;

        let summary = aggregator.recompute_all().await.unwrap();
        assert_eq!(
            summary,
            RecomputeSummary {
                updated: 2,
                skipped: 0,
                failed: 0
            }
        );
        // Batch recomputes feed the reassignment that follows them directly
        assert_eq!(aggregator.events().pending(), 0);
    }

    #[tokio::test]
    async fn reconcile_only_touches_drifted_items() {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = aggregator(&store);
        let current = seed_item(&store, &[7.0]).await;
        let drifted = seed_item(&store, &[4.0]).await;
        aggregator.recompute(current).await.unwrap();
        aggregator.recompute(drifted).await.unwrap();

        let review = Review::new(drifted, Uuid::new_v4(), Rating::new(10.0).unwrap(), "");
        ReviewRepository::insert(store.as_ref(), review).await.unwrap();

        let summary = aggregator.reconcile_all().await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failed, 0);

        let repaired = ItemRepository::find_by_id(store.as_ref(), drifted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(repaired.aggregate.review_count, 2);
        assert!((repaired.aggregate.average_rating - 7.0).abs() < 1e-9);
    }
}
