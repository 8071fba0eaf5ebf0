pub mod entities;
pub mod repository;

pub use entities::{Job, JobRecord, JobStatus, JobType, RecomputeJobPayload};
pub use repository::{JobRepository, JobStatistics};
