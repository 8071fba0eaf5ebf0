use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::modules::catalog::application::ReviewService;
use crate::modules::jobs::BackgroundWorker;
use crate::modules::rankings::application::{RankAssigner, RankingQueryService};
use crate::modules::ratings::RatingAggregator;
use crate::shared::application::PageLimits;

/// Services shared by every HTTP handler.
///
/// Handlers extract only the service they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub rankings: Arc<RankingQueryService>,
    pub reviews: Arc<ReviewService>,
    pub aggregator: Arc<RatingAggregator>,
    pub assigner: Arc<RankAssigner>,
    pub worker: Arc<BackgroundWorker>,
    pub pages: PageLimits,
    pub started_at: Instant,
}

impl FromRef<AppState> for Arc<RankingQueryService> {
    fn from_ref(state: &AppState) -> Self {
        state.rankings.clone()
    }
}

impl FromRef<AppState> for Arc<ReviewService> {
    fn from_ref(state: &AppState) -> Self {
        state.reviews.clone()
    }
}

impl FromRef<AppState> for Arc<RatingAggregator> {
    fn from_ref(state: &AppState) -> Self {
        state.aggregator.clone()
    }
}

impl FromRef<AppState> for Arc<RankAssigner> {
    fn from_ref(state: &AppState) -> Self {
        state.assigner.clone()
    }
}

impl FromRef<AppState> for Arc<BackgroundWorker> {
    fn from_ref(state: &AppState) -> Self {
        state.worker.clone()
    }
}

impl FromRef<AppState> for PageLimits {
    fn from_ref(state: &AppState) -> Self {
        state.pages
    }
}
