/// Diesel models for the import_jobs table
use crate::modules::contact_import::domain::entities::{ImportJob, ImportRecordError};
use crate::modules::contact_import::domain::value_objects::ImportJobStatusDb;
use crate::schema::import_jobs;
use crate::shared::errors::AppResult;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Insertable, Debug)]
#[diesel(table_name = import_jobs)]
pub struct NewImportJob {
    pub id: String,
    pub company_id: i64,
    pub user_id: i64,
    pub source: String,
    pub file_name: Option<String>,
    pub status: ImportJobStatusDb,
    pub started_at: DateTime<Utc>,
}

impl From<&ImportJob> for NewImportJob {
    fn from(job: &ImportJob) -> Self {
        Self {
            id: job.id.clone(),
            company_id: job.company_id,
            user_id: job.user_id,
            source: job.source.clone(),
            file_name: job.file_name.clone(),
            status: job.status.into(),
            started_at: job.started_at,
        }
    }
}

/// Terminal write; counters and timings are frozen from here on
#[derive(AsChangeset, Debug)]
#[diesel(table_name = import_jobs, treat_none_as_null = true)]
pub struct ImportJobCompletion {
    pub status: ImportJobStatusDb,
    pub total_records: i32,
    pub processed_records: i32,
    pub created_records: i32,
    pub updated_records: i32,
    pub tagged_records: i32,
    pub failed_records: i32,
    pub errors: JsonValue,
    pub error_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub execution_time_seconds: Option<i32>,
}

impl ImportJobCompletion {
    pub fn from_job(job: &ImportJob) -> AppResult<Self> {
        Ok(Self {
            status: job.status.into(),
            total_records: job.total_records,
            processed_records: job.processed_records,
            created_records: job.created_records,
            updated_records: job.updated_records,
            tagged_records: job.tagged_records,
            failed_records: job.failed_records,
            errors: serde_json::to_value(&job.errors)?,
            error_message: job.error_message.clone(),
            completed_at: job.completed_at,
            execution_time_seconds: job.execution_time_seconds,
        })
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = import_jobs)]
pub struct ImportJobModel {
    pub id: String,
    pub company_id: i64,
    pub user_id: i64,
    pub source: String,
    pub file_name: Option<String>,
    pub status: ImportJobStatusDb,
    pub total_records: i32,
    pub processed_records: i32,
    pub created_records: i32,
    pub updated_records: i32,
    pub tagged_records: i32,
    pub failed_records: i32,
    pub errors: JsonValue,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub execution_time_seconds: Option<i32>,
}

impl ImportJobModel {
    pub fn to_import_job(self) -> AppResult<ImportJob> {
        let errors: Vec<ImportRecordError> = serde_json::from_value(self.errors)?;

        Ok(ImportJob {
            id: self.id,
            company_id: self.company_id,
            user_id: self.user_id,
            source: self.source,
            file_name: self.file_name,
            status: self.status.into(),
            total_records: self.total_records,
            processed_records: self.processed_records,
            created_records: self.created_records,
            updated_records: self.updated_records,
            tagged_records: self.tagged_records,
            failed_records: self.failed_records,
            errors,
            error_message: self.error_message,
            started_at: self.started_at,
            completed_at: self.completed_at,
            execution_time_seconds: self.execution_time_seconds,
        })
    }
}
