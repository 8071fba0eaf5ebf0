use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::application::{RankedPage, RankingQuery, RankingQueryService};
use super::domain::CategorySummary;
use crate::shared::application::{PageLimits, PaginationParams, Query as _};
use crate::shared::errors::ApiError;

/// Raw query-string values; numbers are validated by `PaginationParams::parse`
/// so malformed input maps to a JSON 400 instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetRankingsRequest {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub subcategory: Option<String>,
}

pub async fn get_rankings(
    Path(category_id): Path<String>,
    Query(request): Query<GetRankingsRequest>,
    State(rankings): State<Arc<RankingQueryService>>,
    State(limits): State<PageLimits>,
) -> Result<Json<RankedPage>, ApiError> {
    let page = PaginationParams::parse(
        request.limit.as_deref(),
        request.offset.as_deref(),
        limits,
    )?;
    let query = RankingQuery::new(category_id, request.subcategory, page);

    Ok(Json(rankings.execute(query).await?))
}

pub async fn get_categories(
    State(rankings): State<Arc<RankingQueryService>>,
) -> Json<Vec<CategorySummary>> {
    Json(rankings.categories())
}
