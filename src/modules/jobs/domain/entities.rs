/// Domain entities for the background job system
///
/// Jobs carry rating recomputes triggered by review mutations and rank
/// reassignments requested by maintenance.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    RecomputeRating,
    ReassignRanks,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobType::RecomputeRating => write!(f, "recompute_rating"),
            JobType::ReassignRanks => write!(f, "reassign_ranks"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recompute_rating" => Ok(JobType::RecomputeRating),
            "reassign_ranks" => Ok(JobType::ReassignRanks),
            _ => Err(format!("Invalid job type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeJobPayload {
    pub item_id: Uuid,
}

/// New job to be queued
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub job_type: JobType,
    pub payload: serde_json::Value,
    /// Lower runs first
    pub priority: i32,
}

impl Job {
    pub fn recompute(item_id: Uuid) -> Self {
        Self {
            job_type: JobType::RecomputeRating,
            payload: serde_json::json!({ "item_id": item_id }),
            priority: 5,
        }
    }

    pub fn reassign() -> Self {
        Self {
            job_type: JobType::ReassignRanks,
            payload: serde_json::json!({}),
            priority: 10,
        }
    }
}

/// Stored job with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub job_type: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    /// Not dequeued before this instant (retry backoff)
    pub available_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl JobRecord {
    pub fn parse_job_type(&self) -> Result<JobType, String> {
        self.job_type.parse()
    }

    pub fn parse_status(&self) -> Result<JobStatus, String> {
        self.status.parse()
    }

    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn parse_recompute_payload(&self) -> Result<RecomputeJobPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Whether `job` would duplicate this record while it is still waiting to run
    pub fn coalesces_with(&self, job: &Job) -> bool {
        self.status == JobStatus::Pending.to_string()
            && self.job_type == job.job_type.to_string()
            && self.payload == job.payload
    }
}
