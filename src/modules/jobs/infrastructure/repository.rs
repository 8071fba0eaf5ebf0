/// Diesel-based implementation of JobRepository
///
/// Uses PostgreSQL with SELECT FOR UPDATE SKIP LOCKED for atomic job dequeuing.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobStatus};
use crate::modules::jobs::domain::repository::{JobRepository, JobStatistics};
use crate::modules::jobs::infrastructure::models::{BackgroundJobModel, NewJob};
use crate::schema::background_jobs;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::Database;
use async_trait::async_trait;
use diesel::prelude::*;
use std::time::Duration;
use uuid::Uuid;

/// Helper struct for grouped COUNT queries
#[derive(QueryableByName)]
struct StatusCount {
    #[diesel(sql_type = diesel::sql_types::Text)]
    status: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

const RETURNING_COLUMNS: &str = "id, job_type, payload, priority, status, attempts, \
     max_attempts, created_at, available_at, started_at, completed_at, error";

pub struct JobRepositoryImpl {
    db: Database,
    max_attempts: i32,
}

impl JobRepositoryImpl {
    pub fn new(db: Database, max_attempts: u32) -> Self {
        Self {
            db,
            max_attempts: i32::try_from(max_attempts.max(1)).unwrap_or(i32::MAX),
        }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord> {
        let max_attempts = self.max_attempts;

        self.db
            .run(move |conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    let existing: Option<BackgroundJobModel> = background_jobs::table
                        .filter(background_jobs::status.eq(JobStatus::Pending.to_string()))
                        .filter(background_jobs::job_type.eq(job.job_type.to_string()))
                        .filter(background_jobs::payload.eq(job.payload.clone()))
                        .select(BackgroundJobModel::as_select())
                        .first(conn)
                        .optional()?;

                    if let Some(existing) = existing {
                        return Ok(existing.into());
                    }

                    let new_job = NewJob {
                        job_type: job.job_type.to_string(),
                        payload: job.payload,
                        priority: job.priority,
                        max_attempts,
                    };

                    let inserted: BackgroundJobModel = diesel::insert_into(background_jobs::table)
                        .values(&new_job)
                        .returning(BackgroundJobModel::as_returning())
                        .get_result(conn)?;
                    Ok(inserted.into())
                })
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to enqueue job: {}", e))
                })
            })
            .await
    }

    async fn dequeue(&self) -> AppResult<Option<JobRecord>> {
        self.db
            .run(|conn| {
                // Atomic claim; concurrent workers skip rows another worker holds
                let query = format!(
                    r#"
                    UPDATE background_jobs
                    SET status = 'running',
                        started_at = NOW(),
                        attempts = attempts + 1
                    WHERE id = (
                        SELECT id
                        FROM background_jobs
                        WHERE status = 'pending'
                          AND attempts < max_attempts
                          AND available_at <= NOW()
                        ORDER BY priority ASC, created_at ASC
                        LIMIT 1
                        FOR UPDATE SKIP LOCKED
                    )
                    RETURNING {}
                    "#,
                    RETURNING_COLUMNS
                );

                let result: Option<BackgroundJobModel> = diesel::sql_query(query)
                    .get_result(conn)
                    .optional()
                    .map_err(|e| AppError::DatabaseError(format!("Failed to dequeue job: {}", e)))?;

                Ok(result.map(Into::into))
            })
            .await
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        self.db
            .run(move |conn| {
                diesel::sql_query(
                    "UPDATE background_jobs
                     SET status = 'completed', completed_at = NOW()
                     WHERE id = $1",
                )
                .bind::<diesel::sql_types::Uuid, _>(job_id)
                .execute(conn)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to mark job as completed: {}", e))
                })?;
                Ok(())
            })
            .await
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str, retry_after: Duration) -> AppResult<()> {
        let error = error.to_string();
        let retry_ms = i64::try_from(retry_after.as_millis()).unwrap_or(i64::MAX);

        self.db
            .run(move |conn| {
                // Attempts left: back to pending after the backoff; otherwise failed for good
                diesel::sql_query(
                    "UPDATE background_jobs
                     SET status = CASE
                         WHEN attempts < max_attempts THEN 'pending'
                         ELSE 'failed'
                     END,
                     completed_at = CASE
                         WHEN attempts >= max_attempts THEN NOW()
                         ELSE NULL
                     END,
                     available_at = NOW() + ($3 * INTERVAL '1 millisecond'),
                     started_at = NULL,
                     error = $2
                     WHERE id = $1",
                )
                .bind::<diesel::sql_types::Uuid, _>(job_id)
                .bind::<diesel::sql_types::Text, _>(error)
                .bind::<diesel::sql_types::BigInt, _>(retry_ms)
                .execute(conn)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to mark job as failed: {}", e))
                })?;
                Ok(())
            })
            .await
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        self.db
            .run(move |conn| {
                let job: Option<BackgroundJobModel> = background_jobs::table
                    .find(job_id)
                    .select(BackgroundJobModel::as_select())
                    .first(conn)
                    .optional()
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to get job by id: {}", e))
                    })?;
                Ok(job.map(Into::into))
            })
            .await
    }

    async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>> {
        self.db
            .run(|conn| {
                let jobs: Vec<BackgroundJobModel> = background_jobs::table
                    .filter(background_jobs::status.eq(JobStatus::Pending.to_string()))
                    .order((background_jobs::priority.asc(), background_jobs::created_at.asc()))
                    .select(BackgroundJobModel::as_select())
                    .load(conn)
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to get pending jobs: {}", e))
                    })?;
                Ok(jobs.into_iter().map(Into::into).collect())
            })
            .await
    }

    async fn get_jobs_for_item(&self, item_id: Uuid) -> AppResult<Vec<JobRecord>> {
        self.db
            .run(move |conn| {
                let query = format!(
                    "SELECT {} FROM background_jobs
                     WHERE job_type = 'recompute_rating' AND payload->>'item_id' = $1
                     ORDER BY created_at DESC",
                    RETURNING_COLUMNS
                );
                let jobs: Vec<BackgroundJobModel> = diesel::sql_query(query)
                    .bind::<diesel::sql_types::Text, _>(item_id.to_string())
                    .load(conn)
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to get jobs for item: {}", e))
                    })?;
                Ok(jobs.into_iter().map(Into::into).collect())
            })
            .await
    }

    async fn delete_old_completed(&self, days: i32) -> AppResult<usize> {
        self.db
            .run(move |conn| {
                diesel::sql_query(
                    "DELETE FROM background_jobs
                     WHERE status IN ('completed', 'failed')
                     AND completed_at <= NOW() - INTERVAL '1 day' * $1",
                )
                .bind::<diesel::sql_types::Integer, _>(days)
                .execute(conn)
                .map_err(|e| AppError::DatabaseError(format!("Failed to delete old jobs: {}", e)))
            })
            .await
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        self.db
            .run(|conn| {
                let counts: Vec<StatusCount> = diesel::sql_query(
                    "SELECT status, COUNT(*) AS count FROM background_jobs GROUP BY status",
                )
                .load(conn)
                .map_err(|e| AppError::DatabaseError(format!("Failed to count jobs: {}", e)))?;

                let mut stats = JobStatistics::default();
                for row in counts {
                    match row.status.parse::<JobStatus>() {
                        Ok(JobStatus::Pending) => stats.pending_count = row.count,
                        Ok(JobStatus::Running) => stats.running_count = row.count,
                        Ok(JobStatus::Completed) => stats.completed_count = row.count,
                        Ok(JobStatus::Failed) => stats.failed_count = row.count,
                        Err(_) => {}
                    }
                    stats.total_count += row.count;
                }
                Ok(stats)
            })
            .await
    }
}
