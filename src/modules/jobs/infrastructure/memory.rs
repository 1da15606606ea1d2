/// In-process implementation of JobRepository
///
/// Same claim/retry/removal semantics as the PostgreSQL queue, kept in a mutex-guarded map.
/// Used when the pipeline is embedded without a database and by the test suite.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobStatus, JobType};
use crate::modules::jobs::domain::repository::{JobRepository, JobStatistics};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_jobs<T>(&self, f: impl FnOnce(&mut HashMap<Uuid, JobRecord>) -> T) -> AppResult<T> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| AppError::InternalError("Job store lock poisoned".to_string()))?;
        Ok(f(&mut jobs))
    }
}

fn queue_order(a: &JobRecord, b: &JobRecord) -> std::cmp::Ordering {
    a.priority
        .cmp(&b.priority)
        .then(a.run_at.cmp(&b.run_at))
        .then(a.created_at.cmp(&b.created_at))
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord> {
        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            job_type: job.job_type.to_string(),
            run_at: job.run_at(now),
            job_key: job.job_key,
            payload: job.payload,
            priority: job.priority,
            status: JobStatus::Pending.to_string(),
            attempts: 0,
            max_attempts: job.max_attempts,
            created_at: now,
            started_at: None,
            completed_at: None,
            error: None,
        };

        self.with_jobs(|jobs| {
            jobs.insert(record.id, record.clone());
        })?;

        Ok(record)
    }

    async fn dequeue(&self, job_type: JobType) -> AppResult<Option<JobRecord>> {
        let now = Utc::now();
        let type_name = job_type.to_string();
        let pending = JobStatus::Pending.to_string();

        self.with_jobs(|jobs| {
            let next_id = jobs
                .values()
                .filter(|j| {
                    j.status == pending
                        && j.job_type == type_name
                        && j.run_at <= now
                        && j.attempts < j.max_attempts
                })
                .min_by(|a, b| queue_order(a, b))
                .map(|j| j.id)?;

            let job = jobs.get_mut(&next_id)?;
            job.status = JobStatus::Running.to_string();
            job.started_at = Some(now);
            job.attempts += 1;
            Some(job.clone())
        })
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        self.with_jobs(|jobs| {
            if let Some(job) = jobs.get_mut(&job_id) {
                job.status = JobStatus::Completed.to_string();
                job.completed_at = Some(Utc::now());
            }
        })
    }

    async fn remove(&self, job_id: Uuid) -> AppResult<()> {
        self.with_jobs(|jobs| {
            jobs.remove(&job_id);
        })
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        self.with_jobs(|jobs| {
            if let Some(job) = jobs.get_mut(&job_id) {
                if job.can_retry() {
                    job.status = JobStatus::Pending.to_string();
                    job.completed_at = None;
                } else {
                    job.status = JobStatus::Failed.to_string();
                    job.completed_at = Some(Utc::now());
                }
                job.started_at = None;
                job.error = Some(error.to_string());
            }
        })
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        self.with_jobs(|jobs| jobs.get(&job_id).cloned())
    }

    async fn find_by_key(&self, job_key: &str) -> AppResult<Vec<JobRecord>> {
        self.with_jobs(|jobs| {
            let mut matching: Vec<JobRecord> = jobs
                .values()
                .filter(|j| j.job_key.as_deref() == Some(job_key))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            matching
        })
    }

    async fn get_pending_jobs(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>> {
        let pending = JobStatus::Pending.to_string();
        let type_name = job_type.map(|t| t.to_string());

        self.with_jobs(|jobs| {
            let mut result: Vec<JobRecord> = jobs
                .values()
                .filter(|j| j.status == pending)
                .filter(|j| type_name.as_ref().map_or(true, |t| &j.job_type == t))
                .cloned()
                .collect();
            result.sort_by(queue_order);
            result
        })
    }

    async fn delete_old_finished(&self, days: i32) -> AppResult<usize> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
        let finished = [JobStatus::Completed.to_string(), JobStatus::Failed.to_string()];

        self.with_jobs(|jobs| {
            let before = jobs.len();
            jobs.retain(|_, j| {
                !(finished.contains(&j.status) && j.completed_at.map_or(false, |at| at < cutoff))
            });
            before - jobs.len()
        })
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        self.with_jobs(|jobs| {
            let mut stats = JobStatistics::default();
            for job in jobs.values() {
                match job.parse_status() {
                    Ok(JobStatus::Pending) => stats.pending_count += 1,
                    Ok(JobStatus::Running) => stats.running_count += 1,
                    Ok(JobStatus::Completed) => stats.completed_count += 1,
                    Ok(JobStatus::Failed) => stats.failed_count += 1,
                    Err(_) => {}
                }
                stats.total_count += 1;
            }
            stats
        })
    }
}
