/// Background worker for rating recompute jobs and the rank maintenance cycle
///
/// Two loops share one cancellation token: the job loop drains the queue, the
/// maintenance loop refreshes the prior mean and reassigns ranks on a timer or
/// as soon as enough aggregation events have accumulated.
use crate::modules::jobs::domain::entities::{JobRecord, JobType};
use crate::modules::jobs::domain::repository::JobRepository;
use crate::modules::rankings::application::{RankAssigner, ReassignmentSummary};
use crate::modules::ratings::application::{RatingAggregator, RecomputeSummary};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::retry::RetryConfig;
use crate::{log_debug, log_error, log_info, log_warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Finished jobs older than this are pruned at the end of each maintenance cycle
const FINISHED_JOB_RETENTION_DAYS: i32 = 7;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub reassign_interval: Duration,
    /// Backoff between delivery attempts of a failed job
    pub retry: RetryConfig,
}

/// Result of one maintenance cycle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub prior_mean: f64,
    pub prior_mean_moved: bool,
    /// Every item, when the prior mean moved
    pub recomputed: Option<RecomputeSummary>,
    /// Only items whose aggregate drifted from their reviews, otherwise
    pub reconciled: Option<RecomputeSummary>,
    pub reassignment: ReassignmentSummary,
}

pub struct BackgroundWorker {
    job_repository: Arc<dyn JobRepository>,
    aggregator: Arc<RatingAggregator>,
    assigner: Arc<RankAssigner>,
    config: WorkerConfig,
    cancel: CancellationToken,
    processed: AtomicU64,
    failed: AtomicU64,
    cycles: AtomicU64,
}

impl BackgroundWorker {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        aggregator: Arc<RatingAggregator>,
        assigner: Arc<RankAssigner>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            job_repository,
            aggregator,
            assigner,
            config,
            cancel: CancellationToken::new(),
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
        }
    }

    /// Spawn the job loop and the maintenance loop
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        vec![
            tokio::spawn(Arc::clone(self).run()),
            tokio::spawn(Arc::clone(self).run_maintenance()),
        ]
    }

    /// Job loop: drains the queue, sleeping `poll_interval` when it is empty.
    pub async fn run(self: Arc<Self>) {
        log_info!("Background worker started");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            match self.process_next_job().await {
                // A job was processed, try the next one right away
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => log_error!("Error in worker loop: {}", e),
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        log_info!("Background worker stopped");
    }

    /// Maintenance loop: runs a cycle every `reassign_interval`, or earlier
    /// when the aggregation event threshold is crossed.
    pub async fn run_maintenance(self: Arc<Self>) {
        log_info!(
            "Maintenance loop started (interval {:?})",
            self.config.reassign_interval
        );
        let events = Arc::clone(self.aggregator.events());

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.reassign_interval) => {
                    log_debug!("Maintenance cycle due to interval");
                }
                _ = events.notified() => {
                    log_debug!(pending = events.pending(), "Maintenance cycle due to aggregation events");
                }
            }

            if let Err(e) = self.maintenance_cycle().await {
                log_error!("Maintenance cycle failed: {}", e);
            }
            // Events recorded while the cycle ran were applied by its reassignment
            if !events.threshold_reached() {
                events.discard_wakeup();
            }
        }

        log_info!("Maintenance loop stopped");
    }

    /// Refresh `m`, bring stored aggregates in line with the reviews, then
    /// reassign ranks.
    ///
    /// When `m` moved every item is recomputed; otherwise only items whose
    /// aggregate no longer matches their reviews are.
    pub async fn maintenance_cycle(&self) -> AppResult<MaintenanceReport> {
        let refresh = self.aggregator.refresh_prior_mean().await?;
        // The first refresh after start has no previous value to compare against
        let moved = refresh.previous.is_some() && refresh.moved();

        let (recomputed, reconciled) = if moved {
            (Some(self.aggregator.recompute_all().await?), None)
        } else {
            (None, Some(self.aggregator.reconcile_all().await?))
        };

        let reassignment = self.assigner.reassign_all().await?;
        self.cycles.fetch_add(1, Ordering::Relaxed);

        match self
            .job_repository
            .delete_old_completed(FINISHED_JOB_RETENTION_DAYS)
            .await
        {
            Ok(0) => {}
            Ok(pruned) => log_debug!("Pruned {} finished jobs", pruned),
            Err(e) => log_warn!("Failed to prune finished jobs: {}", e),
        }

        Ok(MaintenanceReport {
            prior_mean: refresh.current,
            prior_mean_moved: moved,
            recomputed,
            reconciled,
            reassignment,
        })
    }

    pub fn stop(&self) {
        self.cancel.cancel();
        log_info!("Background worker stop requested");
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true if a job was processed, false if the queue had nothing due
    pub async fn process_next_job(&self) -> AppResult<bool> {
        let job = match self.job_repository.dequeue().await? {
            Some(job) => job,
            None => return Ok(false),
        };

        log_debug!(
            "Processing job {} (type: {}, attempts: {}/{})",
            job.id,
            job.job_type,
            job.attempts,
            job.max_attempts
        );

        match self.handle(&job).await {
            Ok(()) => {
                self.job_repository.mark_completed(job.id).await?;
                self.processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                let error_msg = e.to_string();
                let retry_after = self
                    .config
                    .retry
                    .delay_for(u32::try_from(job.attempts.max(1) - 1).unwrap_or(0));

                if job.can_retry() {
                    log_warn!(
                        "Job {} failed (attempt {}/{}), retrying in {:?}: {}",
                        job.id,
                        job.attempts,
                        job.max_attempts,
                        retry_after,
                        error_msg
                    );
                } else {
                    log_error!(
                        "Job {} failed permanently after {} attempts: {}",
                        job.id,
                        job.attempts,
                        error_msg
                    );
                    self.failed.fetch_add(1, Ordering::Relaxed);
                }
                self.job_repository
                    .mark_failed(job.id, &error_msg, retry_after)
                    .await?;
            }
        }

        Ok(true)
    }

    async fn handle(&self, job: &JobRecord) -> AppResult<()> {
        match job.parse_job_type() {
            Ok(JobType::RecomputeRating) => {
                let payload = job.parse_recompute_payload().map_err(|e| {
                    AppError::InvalidInput(format!("Invalid recompute payload: {}", e))
                })?;
                self.aggregator.recompute(payload.item_id).await?;
                Ok(())
            }
            Ok(JobType::ReassignRanks) => {
                self.assigner.reassign_all().await?;
                Ok(())
            }
            Err(e) => Err(AppError::InvalidInput(format!("Invalid job type: {}", e))),
        }
    }

    pub async fn get_statistics(&self) -> AppResult<WorkerStatistics> {
        let job_stats = self.job_repository.get_statistics().await?;

        Ok(WorkerStatistics {
            is_running: !self.cancel.is_cancelled(),
            processed_jobs: self.processed.load(Ordering::Relaxed),
            failed_jobs: self.failed.load(Ordering::Relaxed),
            maintenance_cycles: self.cycles.load(Ordering::Relaxed),
            prior_mean: self.aggregator.cached_prior_mean().await,
            pending_jobs: job_stats.pending_count,
            running_jobs: job_stats.running_count,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatistics {
    pub is_running: bool,
    pub processed_jobs: u64,
    pub failed_jobs: u64,
    pub maintenance_cycles: u64,
    pub prior_mean: f64,
    pub pending_jobs: i64,
    pub running_jobs: i64,
}
