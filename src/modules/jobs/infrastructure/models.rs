/// Row mappings for the `background_jobs` queue table
use crate::modules::jobs::domain::entities::{JobRecord, JobStatus};
use crate::modules::jobs::domain::value_objects::JobStatusDb;
use crate::schema::background_jobs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Insert shape; status, attempts and created_at come from column defaults
#[derive(Insertable, Debug)]
#[diesel(table_name = background_jobs)]
pub struct NewJob {
    pub job_type: String,
    pub job_key: Option<String>,
    pub payload: JsonValue,
    pub priority: i32,
    pub max_attempts: i32,
    pub run_at: DateTime<Utc>,
}

/// Full queue row, also loadable from the raw `UPDATE ... RETURNING` claim query
#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = background_jobs)]
pub struct BackgroundJobModel {
    pub id: Uuid,
    pub job_type: String,
    pub job_key: Option<String>,
    pub payload: JsonValue,
    pub priority: i32,
    pub status: JobStatusDb,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<BackgroundJobModel> for JobRecord {
    fn from(model: BackgroundJobModel) -> Self {
        JobRecord {
            id: model.id,
            job_type: model.job_type,
            job_key: model.job_key,
            payload: model.payload,
            priority: model.priority,
            status: JobStatus::from(model.status).to_string(),
            attempts: model.attempts,
            max_attempts: model.max_attempts,
            run_at: model.run_at,
            created_at: model.created_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
            error: model.error,
        }
    }
}
