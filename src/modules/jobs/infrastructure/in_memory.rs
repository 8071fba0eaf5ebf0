/// Process-local job queue
///
/// Same contract as the PostgreSQL queue: priority then FIFO order, retry
/// backoff through `available_at`, and coalescing of identical pending jobs.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobStatus, JobType};
use crate::modules::jobs::domain::repository::{JobRepository, JobStatistics};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct InMemoryJobQueue {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
    max_attempts: i32,
}

impl InMemoryJobQueue {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            max_attempts: i32::try_from(max_attempts.max(1)).unwrap_or(i32::MAX),
        }
    }
}

fn status_is(job: &JobRecord, status: JobStatus) -> bool {
    job.status == status.to_string()
}

#[async_trait]
impl JobRepository for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord> {
        let mut jobs = self.jobs.lock().await;

        if let Some(existing) = jobs.values().find(|record| record.coalesces_with(&job)) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            job_type: job.job_type.to_string(),
            payload: job.payload,
            priority: job.priority,
            status: JobStatus::Pending.to_string(),
            attempts: 0,
            max_attempts: self.max_attempts,
            created_at: now,
            available_at: now,
            started_at: None,
            completed_at: None,
            error: None,
        };
        jobs.insert(record.id, record.clone());
        Ok(record)
    }

    async fn dequeue(&self) -> AppResult<Option<JobRecord>> {
        let mut jobs = self.jobs.lock().await;
        let now = Utc::now();

        let next = jobs
            .values()
            .filter(|job| {
                status_is(job, JobStatus::Pending)
                    && job.attempts < job.max_attempts
                    && job.available_at <= now
            })
            .min_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            })
            .map(|job| job.id);

        let Some(id) = next else {
            return Ok(None);
        };

        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| AppError::InternalError(format!("job {} vanished", id)))?;
        job.status = JobStatus::Running.to_string();
        job.started_at = Some(now);
        job.attempts += 1;
        Ok(Some(job.clone()))
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {}", job_id)))?;
        job.status = JobStatus::Completed.to_string();
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str, retry_after: Duration) -> AppResult<()> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::NotFound(format!("job {}", job_id)))?;

        let now = Utc::now();
        if job.can_retry() {
            job.status = JobStatus::Pending.to_string();
            job.available_at =
                now + chrono::Duration::from_std(retry_after).unwrap_or_else(|_| chrono::Duration::zero());
            job.completed_at = None;
        } else {
            job.status = JobStatus::Failed.to_string();
            job.completed_at = Some(now);
        }
        job.started_at = None;
        job.error = Some(error.to_string());
        Ok(())
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        Ok(self.jobs.lock().await.get(&job_id).cloned())
    }

    async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>> {
        let jobs = self.jobs.lock().await;
        let mut pending: Vec<JobRecord> = jobs
            .values()
            .filter(|job| status_is(job, JobStatus::Pending))
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.created_at.cmp(&b.created_at)));
        Ok(pending)
    }

    async fn get_jobs_for_item(&self, item_id: Uuid) -> AppResult<Vec<JobRecord>> {
        let jobs = self.jobs.lock().await;
        let mut matching: Vec<JobRecord> = jobs
            .values()
            .filter(|job| job.job_type == JobType::RecomputeRating.to_string())
            .filter(|job| {
                job.parse_recompute_payload()
                    .map(|payload| payload.item_id == item_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn delete_old_completed(&self, days: i32) -> AppResult<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let mut jobs = self.jobs.lock().await;
        let before = jobs.len();
        jobs.retain(|_, job| {
            let finished = status_is(job, JobStatus::Completed) || status_is(job, JobStatus::Failed);
            !(finished && job.completed_at.is_some_and(|at| at <= cutoff))
        });
        Ok(before - jobs.len())
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let jobs = self.jobs.lock().await;
        let count = |status: JobStatus| jobs.values().filter(|job| status_is(job, status)).count() as i64;

        Ok(JobStatistics {
            pending_count: count(JobStatus::Pending),
            running_count: count(JobStatus::Running),
            completed_count: count(JobStatus::Completed),
            failed_count: count(JobStatus::Failed),
            total_count: jobs.len() as i64,
        })
    }
}
