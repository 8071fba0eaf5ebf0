/// Repository trait for job persistence
///
/// Implemented in memory by default and on PostgreSQL behind the `postgres` feature.
use crate::modules::jobs::domain::entities::{Job, JobRecord};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Enqueue a job. An identical job that is still pending is returned instead of a duplicate.
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord>;

    /// Claim the next available pending job, or `None` when nothing is due
    async fn dequeue(&self) -> AppResult<Option<JobRecord>>;

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()>;

    /// Record a failure. Jobs with attempts left go back to pending after `retry_after`.
    async fn mark_failed(&self, job_id: Uuid, error: &str, retry_after: Duration) -> AppResult<()>;

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;

    async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>>;

    /// Recompute jobs targeting one item, newest first
    async fn get_jobs_for_item(&self, item_id: Uuid) -> AppResult<Vec<JobRecord>>;

    /// Delete finished jobs older than `days`
    async fn delete_old_completed(&self, days: i32) -> AppResult<usize>;

    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    pub pending_count: i64,
    pub running_count: i64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub total_count: i64,
}
