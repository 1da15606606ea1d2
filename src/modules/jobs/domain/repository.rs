/// Storage contract of the durable job queue
///
/// Claims are atomic per row: two workers calling `dequeue` never receive the same job.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobType};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord>;

    /// Claim the next due pending job of `job_type`, ordered by priority then due time
    async fn dequeue(&self, job_type: JobType) -> AppResult<Option<JobRecord>>;

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()>;

    /// Drop the row entirely (remove-on-complete)
    async fn remove(&self, job_id: Uuid) -> AppResult<()>;

    /// Record a failed execution; the job is pending again while attempts remain
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;

    /// Jobs carrying the given caller-facing key, newest first
    async fn find_by_key(&self, job_key: &str) -> AppResult<Vec<JobRecord>>;

    /// Pending jobs, optionally of one type, in claim order
    async fn get_pending_jobs(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>>;

    /// Retention sweep over completed and failed rows older than `days`
    async fn delete_old_finished(&self, days: i32) -> AppResult<usize>;

    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

/// Row counts per queue status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatistics {
    pub pending_count: i64,
    pub running_count: i64,
    pub completed_count: i64,
    pub failed_count: i64,
    pub total_count: i64,
}
