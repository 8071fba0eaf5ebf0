/// Diesel models for the background_jobs table
use crate::modules::jobs::domain::entities::JobRecord;
use crate::schema::background_jobs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Insertable, Debug)]
#[diesel(table_name = background_jobs)]
pub struct NewJob {
    pub job_type: String,
    pub payload: JsonValue,
    pub priority: i32,
    pub max_attempts: i32,
}

#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = background_jobs)]
pub struct BackgroundJobModel {
    pub id: Uuid,
    pub job_type: String,
    pub payload: JsonValue,
    pub priority: i32,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: DateTime<Utc>,
    pub available_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<BackgroundJobModel> for JobRecord {
    fn from(model: BackgroundJobModel) -> Self {
        JobRecord {
            id: model.id,
            job_type: model.job_type,
            payload: model.payload,
            priority: model.priority,
            status: model.status,
            attempts: model.attempts,
            max_attempts: model.max_attempts,
            created_at: model.created_at,
            available_at: model.available_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            error: model.error,
        }
    }
}
