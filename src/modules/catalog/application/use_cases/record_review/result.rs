use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Created,
    Updated,
    Unchanged,
    Deleted,
}

/// Outcome of a review mutation.
///
/// The review write stands even when queuing the recompute failed; in that
/// case `recompute_queued` is false and the next maintenance cycle catches up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCommandResult {
    pub review_id: Uuid,
    pub item_id: Uuid,
    pub action: ReviewAction,
    pub recompute_queued: bool,
    pub job_id: Option<Uuid>,
}
