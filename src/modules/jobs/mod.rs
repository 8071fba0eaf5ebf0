/// Background job system
///
/// Queued delivery of rating recomputes with retry and backoff, plus the
/// periodic rank maintenance cycle.
///
/// Architecture:
/// - Domain: entities and repository trait
/// - Infrastructure: in-memory queue, Diesel queue behind `postgres`
/// - Worker: job loop and maintenance loop
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod worker;

pub use domain::{
    entities::{Job, JobRecord, JobStatus, JobType, RecomputeJobPayload},
    repository::{JobRepository, JobStatistics},
};
pub use infrastructure::InMemoryJobQueue;
#[cfg(feature = "postgres")]
pub use infrastructure::JobRepositoryImpl;
pub use worker::{BackgroundWorker, MaintenanceReport, WorkerConfig, WorkerStatistics};
