/// Domain entities for the background job queue
///
/// Jobs represent async units of work (contact imports and validation batches)
/// that are queued and processed by the background worker.
use crate::shared::errors::AppResult;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle of a queue row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid job status: {}", s))
    }
}

/// Kind of work a queue row carries; each kind has its own worker lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    ContactImport,
    ContactValidationBatch,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::ContactImport => "contact_import",
            JobType::ContactValidationBatch => "contact_validation_batch",
        }
    }

    /// Successful jobs of this type are deleted instead of kept as `completed`
    pub fn removes_on_complete(&self) -> bool {
        matches!(self, JobType::ContactImport)
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [JobType::ContactImport, JobType::ContactValidationBatch]
            .into_iter()
            .find(|job_type| job_type.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid job type: {}", s))
    }
}

/// Work item to be queued; becomes a `JobRecord` once stored
#[derive(Debug, Clone)]
pub struct Job {
    pub job_type: JobType,
    /// Caller-facing identifier (import job id, contact list key)
    pub job_key: Option<String>,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub max_attempts: i32,
    /// Delay before the job becomes due
    pub delay: Duration,
}

impl Job {
    pub fn new<P: Serialize>(job_type: JobType, payload: &P) -> AppResult<Self> {
        Ok(Self {
            job_type,
            job_key: None,
            payload: serde_json::to_value(payload)?,
            priority: 5,
            max_attempts: 1,
            delay: Duration::ZERO,
        })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.job_key = Some(key.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Point in time at which the job becomes due
    pub fn run_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.delay)
            .map(|d| now + d)
            .unwrap_or(now)
    }
}

/// A queue row as stored, including claim and retry bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub job_type: String,
    pub job_key: Option<String>,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
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

    /// Check if job can be retried
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(job_type: &str, attempts: i32, max_attempts: i32) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            job_type: job_type.to_string(),
            job_key: None,
            payload: json!({"contact_list_id": 7, "company_id": 1, "batch_size": 50}),
            priority: 5,
            status: "failed".to_string(),
            attempts,
            max_attempts,
            run_at: Utc::now(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Pending.to_string(), "pending");
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_job_status_from_str() {
        assert_eq!("pending".parse::<JobStatus>().unwrap(), JobStatus::Pending);
        assert_eq!("RUNNING".parse::<JobStatus>().unwrap(), JobStatus::Running);
        assert!("invalid".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_type_round_trips_through_display() {
        for job_type in [JobType::ContactImport, JobType::ContactValidationBatch] {
            assert_eq!(job_type.to_string().parse::<JobType>().unwrap(), job_type);
        }
        assert!("enrichment".parse::<JobType>().is_err());
    }

    #[test]
    fn test_import_jobs_are_removed_on_complete() {
        assert!(JobType::ContactImport.removes_on_complete());
        assert!(!JobType::ContactValidationBatch.removes_on_complete());
    }

    #[test]
    fn test_new_job_defaults_to_single_attempt() {
        let job = Job::new(JobType::ContactImport, &json!({"job_id": "abc"})).unwrap();
        assert_eq!(job.max_attempts, 1);
        assert_eq!(job.delay, Duration::ZERO);
        assert!(job.job_key.is_none());

        let job = job.with_max_attempts(0).with_key("abc");
        assert_eq!(job.max_attempts, 1, "max_attempts is clamped to 1");
        assert_eq!(job.job_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_run_at_applies_delay() {
        let now = Utc::now();
        let job = Job::new(JobType::ContactValidationBatch, &json!({}))
            .unwrap()
            .with_delay(Duration::from_secs(5));

        assert_eq!(job.run_at(now), now + chrono::Duration::seconds(5));
    }

    #[test]
    fn test_job_record_can_retry() {
        let job = record("contact_import", 1, 1);
        assert!(!job.can_retry(), "Single-attempt jobs are never retried");

        let job = record("contact_validation_batch", 1, 3);
        assert!(job.can_retry());
    }

    #[test]
    fn test_job_record_parse_payload() {
        #[derive(Deserialize)]
        struct Payload {
            contact_list_id: i64,
        }

        let job = record("contact_validation_batch", 0, 1);
        let payload: Payload = job.parse_payload().unwrap();
        assert_eq!(payload.contact_list_id, 7);
        assert_eq!(job.parse_job_type().unwrap(), JobType::ContactValidationBatch);
    }
}
