use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::health::health;
use super::state::AppState;
use crate::modules::{catalog::commands::*, jobs::commands::*, rankings::commands::*};

/// Single source of truth for every HTTP route
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Rankings
        .route("/rankings/{category_id}", get(get_rankings))
        .route("/categories", get(get_categories))
        // Catalog and review triggers
        .route("/items/{item_id}", get(get_item))
        .route("/items/{item_id}/reviews", post(submit_review))
        .route("/reviews/{review_id}", axum::routing::patch(edit_review).delete(delete_review))
        .route("/hooks/review-changed", post(review_changed))
        // Maintenance
        .route("/maintenance/reassign", post(reassign_ranks))
        .route("/maintenance/items/{item_id}/recompute", post(recompute_item))
        .route("/maintenance/worker", get(get_worker_statistics))
        // System
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
