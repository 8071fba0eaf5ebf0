/// Tests for background job processing and the maintenance cycle
///
/// Tests cover:
/// - Recompute jobs queued by review writes
/// - Retry then permanent failure of a broken job
/// - Maintenance cycle prior-mean refresh and reassignment
/// - Maintenance repairing aggregates whose recompute was never delivered
/// - Worker lifecycle (start/stop)
mod utils;

use async_trait::async_trait;
use mockall::mock;
use rpg_rankings_lib::modules::catalog::application::{ReviewCommand, ReviewService};
use rpg_rankings_lib::modules::jobs::{Job, JobRecord, JobRepository, JobStatistics, JobType};
use rpg_rankings_lib::modules::rankings::domain::RankStore;
use rpg_rankings_lib::shared::application::UseCase;
use rpg_rankings_lib::shared::errors::{AppError, AppResult};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use utils::{factories::ItemFactory, helpers};
use uuid::Uuid;

// ================================================================================================
// JOB PROCESSING TESTS
// ================================================================================================

#[tokio::test]
async fn worker_processes_a_queued_recompute() {
    let services = helpers::build_test_services().await;
    let item_id = services.add_item(ItemFactory::adventure()).await;

    let result = services
        .state
        .reviews
        .execute(ReviewCommand::submit(item_id, Uuid::new_v4(), 7.5, "solid"))
        .await
        .unwrap();
    let job_id = result.job_id.unwrap();

    // Review written but not yet aggregated
    assert_eq!(services.item(item_id).await.aggregate.review_count, 0);

    let worker = &services.state.worker;
    assert!(tokio_test::assert_ok!(worker.process_next_job().await));
    assert!(!tokio_test::assert_ok!(worker.process_next_job().await));

    let item = services.item(item_id).await;
    assert_eq!(item.aggregate.review_count, 1);
    assert_eq!(item.aggregate.average_rating, 7.5);

    let job = services.queue.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, "completed");
}

#[tokio::test]
async fn repeated_review_changes_coalesce_into_one_job() {
    let services = helpers::build_test_services().await;
    let item_id = services.add_item(ItemFactory::adventure()).await;

    let mut job_ids = Vec::new();
    for rating in [6.0, 7.0, 8.0] {
        let result = services
            .state
            .reviews
            .execute(ReviewCommand::submit(item_id, Uuid::new_v4(), rating, ""))
            .await
            .unwrap();
        job_ids.push(result.job_id.unwrap());
    }

    assert!(job_ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(services.queue.get_pending_jobs().await.unwrap().len(), 1);

    services.state.worker.process_next_job().await.unwrap();
    assert_eq!(services.item(item_id).await.aggregate.review_count, 3);
}

#[tokio::test]
async fn broken_job_is_retried_then_failed() {
    let mut config = helpers::test_config();
    config.maintenance.job_max_attempts = 2;
    let services = helpers::build_test_services_with(config).await;

    let record = services
        .queue
        .enqueue(Job {
            job_type: JobType::RecomputeRating,
            payload: json!({ "unexpected": true }),
            priority: 5,
        })
        .await
        .unwrap();

    let worker = &services.state.worker;
    worker.process_next_job().await.unwrap();
    let after_first = services.queue.get_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(after_first.status, "pending");
    assert_eq!(after_first.attempts, 1);

    worker.process_next_job().await.unwrap();
    let after_second = services.queue.get_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(after_second.status, "failed");
    assert!(after_second.error.is_some());

    assert!(!worker.process_next_job().await.unwrap());
    let stats = worker.get_statistics().await.unwrap();
    assert_eq!(stats.failed_jobs, 1);
}

#[tokio::test]
async fn recompute_of_deleted_item_completes_as_no_op() {
    let services = helpers::build_test_services().await;
    let record = services
        .queue
        .enqueue(Job::recompute(Uuid::new_v4()))
        .await
        .unwrap();

    assert!(services.state.worker.process_next_job().await.unwrap());
    let job = services.queue.get_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(job.status, "completed");
}

// ================================================================================================
// MAINTENANCE CYCLE
// ================================================================================================

#[tokio::test]
async fn maintenance_recomputes_everything_when_the_prior_moves() {
    let services = helpers::build_test_services().await;
    let high = services
        .add_rated_item(ItemFactory::adventure(), &[9.0, 9.0])
        .await;
    services
        .add_rated_item(ItemFactory::adventure(), &[7.0])
        .await;

    // The items were aggregated against the default prior of 5.5
    let report = services.state.worker.maintenance_cycle().await.unwrap();
    assert!((report.prior_mean - 8.0).abs() < 1e-9);
    assert!(report.prior_mean_moved);
    assert_eq!(report.recomputed.unwrap().updated, 2);
    assert_eq!(report.reassignment.ranked_count, 2);

    let item = services.item(high).await;
    assert!((item.aggregate.bayesian_rating - (10.0 * 8.0 + 18.0) / 12.0).abs() < 1e-9);

    let second = services.state.worker.maintenance_cycle().await.unwrap();
    assert!(!second.prior_mean_moved);
    assert!(second.recomputed.is_none());
    assert_eq!(second.reassignment.generation, report.reassignment.generation + 1);
}

// ================================================================================================
// UNDELIVERED RECOMPUTES
// ================================================================================================

mock! {
    pub Jobs {}

    #[async_trait]
    impl JobRepository for Jobs {
        async fn enqueue(&self, job: Job) -> AppResult<JobRecord>;
        async fn dequeue(&self) -> AppResult<Option<JobRecord>>;
        async fn mark_completed(&self, job_id: Uuid) -> AppResult<()>;
        async fn mark_failed(&self, job_id: Uuid, error: &str, retry_after: Duration) -> AppResult<()>;
        async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;
        async fn get_pending_jobs(&self) -> AppResult<Vec<JobRecord>>;
        async fn get_jobs_for_item(&self, item_id: Uuid) -> AppResult<Vec<JobRecord>>;
        async fn delete_old_completed(&self, days: i32) -> AppResult<usize>;
        async fn get_statistics(&self) -> AppResult<JobStatistics>;
    }
}

#[tokio::test]
async fn maintenance_repairs_aggregate_after_failed_enqueue() {
    let services = helpers::build_test_services().await;
    let item_id = services
        .add_rated_item(ItemFactory::adventure(), &[8.0])
        .await;
    services.state.worker.maintenance_cycle().await.unwrap();

    let mut jobs = MockJobs::new();
    jobs.expect_enqueue()
        .returning(|_| Err(AppError::ServiceUnavailable("queue offline".to_string())));
    let reviews = ReviewService::new(
        services.store.clone(),
        services.store.clone(),
        Arc::new(jobs),
    );

    let result = reviews
        .execute(ReviewCommand::submit(item_id, Uuid::new_v4(), 2.0, "fell flat"))
        .await
        .unwrap();
    assert!(!result.recompute_queued);
    assert_eq!(services.item(item_id).await.aggregate.review_count, 1);

    let report = services.state.worker.maintenance_cycle().await.unwrap();
    assert_eq!(report.reconciled.unwrap().updated, 1);

    let item = services.item(item_id).await;
    assert_eq!(item.aggregate.review_count, 2);
    assert!((item.aggregate.average_rating - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn maintenance_repairs_aggregate_after_job_runs_out_of_attempts() {
    let mut config = helpers::test_config();
    config.maintenance.job_max_attempts = 1;
    let services = helpers::build_test_services_with(config).await;
    let item_id = services
        .add_rated_item(ItemFactory::adventure(), &[6.0])
        .await;
    services.state.worker.maintenance_cycle().await.unwrap();
    services.add_reviews(item_id, &[9.0]).await;

    // The recompute job for the new review fails for good
    let record = services.queue.enqueue(Job::recompute(item_id)).await.unwrap();
    let claimed = services.queue.dequeue().await.unwrap().unwrap();
    assert_eq!(claimed.id, record.id);
    services
        .queue
        .mark_failed(record.id, "store unavailable", Duration::ZERO)
        .await
        .unwrap();
    let failed = services.queue.get_by_id(record.id).await.unwrap().unwrap();
    assert_eq!(failed.status, "failed");

    let report = services.state.worker.maintenance_cycle().await.unwrap();
    assert_eq!(report.reconciled.unwrap().updated, 1);

    let item = services.item(item_id).await;
    assert_eq!(item.aggregate.review_count, 2);
    assert!((item.aggregate.average_rating - 7.5).abs() < 1e-9);
}

#[tokio::test]
async fn maintenance_leaves_current_aggregates_alone() {
    let services = helpers::build_test_services().await;
    services
        .add_rated_item(ItemFactory::adventure(), &[7.0, 8.0])
        .await;
    services.state.worker.maintenance_cycle().await.unwrap();

    let report = services.state.worker.maintenance_cycle().await.unwrap();
    let reconciled = report.reconciled.unwrap();
    assert_eq!(reconciled.updated, 0);
    assert_eq!(reconciled.failed, 0);
}

// ================================================================================================
// WORKER LIFECYCLE
// ================================================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn running_worker_aggregates_and_reassigns() {
    let mut config = helpers::test_config();
    config.maintenance.reassign_after_events = 1;
    let services = helpers::build_test_services_with(config).await;
    let item_id = services.add_item(ItemFactory::adventure()).await;

    services
        .state
        .reviews
        .execute(ReviewCommand::submit(item_id, Uuid::new_v4(), 8.0, ""))
        .await
        .unwrap();

    helpers::run_worker_for_duration(services.state.worker.clone(), Duration::from_millis(500))
        .await;

    assert_eq!(services.item(item_id).await.aggregate.review_count, 1);
    let table = services.store.current().await.unwrap();
    assert!(table.generation() >= 1);
    assert_eq!(table.position(&item_id), Some(1));
}

#[tokio::test]
async fn stop_ends_both_loops() {
    let services = helpers::build_test_services().await;
    let worker = services.state.worker.clone();

    let handles = worker.start();
    worker.stop();

    for handle in handles {
        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        tokio_test::assert_ok!(tokio_test::assert_ok!(joined));
    }
    assert!(!worker.get_statistics().await.unwrap().is_running);
}
