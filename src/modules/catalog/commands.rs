use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::application::{ReviewCommand, ReviewCommandResult, ReviewService};
use super::domain::ItemView;
use crate::modules::rankings::application::RankingQueryService;
use crate::shared::application::UseCase;
use crate::shared::errors::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub reviewer_id: Option<Uuid>,
    pub rating: f64,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReviewRequest {
    pub rating: Option<f64>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChangedRequest {
    pub item_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewChangedResponse {
    pub item_id: Uuid,
    pub job_id: Uuid,
}

pub async fn get_item(
    Path(item_id): Path<String>,
    State(rankings): State<Arc<RankingQueryService>>,
) -> Result<Json<ItemView>, ApiError> {
    let item_id = ApiError::parse_id(&item_id, "item")?;
    Ok(Json(rankings.item_view(item_id).await?))
}

pub async fn submit_review(
    Path(item_id): Path<String>,
    State(reviews): State<Arc<ReviewService>>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ReviewCommandResult>), ApiError> {
    let item_id = ApiError::parse_id(&item_id, "item")?;
    let command = ReviewCommand::submit(
        item_id,
        request.reviewer_id.unwrap_or_else(Uuid::new_v4),
        request.rating,
        request.body,
    );

    let result = reviews.execute(command).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn edit_review(
    Path(review_id): Path<String>,
    State(reviews): State<Arc<ReviewService>>,
    Json(request): Json<EditReviewRequest>,
) -> Result<Json<ReviewCommandResult>, ApiError> {
    let review_id = ApiError::parse_id(&review_id, "review")?;
    let command = ReviewCommand::edit(review_id, request.rating, request.body);
    Ok(Json(reviews.execute(command).await?))
}

pub async fn delete_review(
    Path(review_id): Path<String>,
    State(reviews): State<Arc<ReviewService>>,
) -> Result<Json<ReviewCommandResult>, ApiError> {
    let review_id = ApiError::parse_id(&review_id, "review")?;
    Ok(Json(reviews.execute(ReviewCommand::delete(review_id)).await?))
}

/// Trigger from an out-of-process review subsystem: queue a recompute and return at once
pub async fn review_changed(
    State(reviews): State<Arc<ReviewService>>,
    Json(request): Json<ReviewChangedRequest>,
) -> Result<(StatusCode, Json<ReviewChangedResponse>), ApiError> {
    let job_id = reviews.notify_changed(request.item_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ReviewChangedResponse {
            item_id: request.item_id,
            job_id,
        }),
    ))
}
