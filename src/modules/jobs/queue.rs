/// Job queue facade
///
/// The surface the rest of the application talks to: enqueue imports, request their
/// cancellation, and start or continue validation of a contact list.
use crate::modules::contact_import::application::command::ImportJobPayload;
use crate::modules::contact_validation::application::command::ValidationBatchPayload;
use crate::modules::contact_validation::application::ports::BatchScheduler;
use crate::modules::jobs::cancellation::CancellationRegistry;
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobStatus, JobType};
use crate::modules::jobs::domain::repository::JobRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use crate::{log_debug, log_info, log_warn};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_BATCH_SIZE: u32 = 50;

pub struct JobQueue {
    jobs: Arc<dyn JobRepository>,
    cancellation: Arc<CancellationRegistry>,
    default_batch_size: u32,
}

impl JobQueue {
    pub fn new(jobs: Arc<dyn JobRepository>, cancellation: Arc<CancellationRegistry>) -> Self {
        Self {
            jobs,
            cancellation,
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Batch size given to validation payloads that do not carry their own
    pub fn with_default_batch_size(mut self, batch_size: u32) -> Self {
        self.default_batch_size = batch_size.max(1);
        self
    }

    /// Queue row of `key` that is still waiting or executing, if any
    async fn find_live(&self, key: &str) -> AppResult<Option<JobRecord>> {
        Ok(self.jobs.find_by_key(key).await?.into_iter().find(|job| {
            matches!(
                job.parse_status(),
                Ok(JobStatus::Pending) | Ok(JobStatus::Running)
            )
        }))
    }

    /// Queue an import. Single attempt; removed on success, kept on failure.
    ///
    /// A job id that is already queued or running is rejected.
    pub async fn enqueue_import(&self, payload: ImportJobPayload) -> AppResult<JobRecord> {
        if payload.job_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Import job id is required".to_string()));
        }

        if let Some(live) = self.find_live(&payload.job_id).await? {
            return Err(AppError::InvalidInput(format!(
                "Import job {} is already {} (queue id {})",
                payload.job_id, live.status, live.id
            )));
        }

        let job = Job::new(JobType::ContactImport, &payload)?
            .with_key(payload.job_id.clone())
            .with_max_attempts(1);
        let record = self.jobs.enqueue(job).await?;

        log_info!(
            "Queued import {} for company {} (queue id {})",
            payload.job_id,
            payload.company_id,
            record.id
        );
        Ok(record)
    }

    /// Ask a queued or running import to stop. Idempotent; unknown ids are ignored.
    ///
    /// Only ids with a live queue row are recorded, so requests for finished or unknown
    /// jobs never linger in the registry.
    pub async fn cancel_import(&self, job_id: &str) {
        match self.find_live(job_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                log_debug!("Cancel for {} ignored; no queued or running import", job_id);
                return;
            }
            Err(e) => log_warn!("Could not look up import {} before cancelling: {}", job_id, e),
        }

        self.cancellation.request_cancel(job_id);
        LogContext::cancellation(job_id, "requested");
    }

    /// Queue the next validation batch of a list.
    ///
    /// A batch already waiting for the same list is reused instead of starting a second chain.
    pub async fn enqueue_validation_batch(
        &self,
        mut payload: ValidationBatchPayload,
        delay: Option<Duration>,
    ) -> AppResult<JobRecord> {
        payload.batch_size = Some(payload.batch_size_or(self.default_batch_size));
        let key = payload.job_key();

        let waiting = self
            .jobs
            .find_by_key(&key)
            .await?
            .into_iter()
            .find(|job| matches!(job.parse_status(), Ok(JobStatus::Pending)));
        if let Some(existing) = waiting {
            log_debug!("Validation of {} already queued as {}", key, existing.id);
            return Ok(existing);
        }

        let job = Job::new(JobType::ContactValidationBatch, &payload)?
            .with_key(key)
            .with_delay(delay.unwrap_or(Duration::ZERO));
        let record = self.jobs.enqueue(job).await?;

        log_debug!(
            "Queued validation batch for list {} (due {})",
            payload.contact_list_id,
            record.run_at
        );
        Ok(record)
    }

    pub fn cancellation(&self) -> Arc<CancellationRegistry> {
        self.cancellation.clone()
    }
}

#[async_trait]
impl BatchScheduler for JobQueue {
    async fn schedule_validation_batch(
        &self,
        payload: ValidationBatchPayload,
        delay: Duration,
    ) -> AppResult<()> {
        self.enqueue_validation_batch(payload, Some(delay)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::infrastructure::InMemoryJobRepository;

    fn queue() -> (JobQueue, Arc<InMemoryJobRepository>) {
        let jobs = Arc::new(InMemoryJobRepository::new());
        (
            JobQueue::new(jobs.clone(), Arc::new(CancellationRegistry::new())),
            jobs,
        )
    }

    #[tokio::test]
    async fn test_import_is_single_attempt_and_keyed() {
        let (queue, _) = queue();
        let payload = ImportJobPayload::new(1, 2, "Ana", "file").with_job_id("job-1");

        let record = queue.enqueue_import(payload).await.unwrap();
        assert_eq!(record.max_attempts, 1);
        assert_eq!(record.job_key.as_deref(), Some("job-1"));
        assert_eq!(record.parse_job_type().unwrap(), JobType::ContactImport);
    }

    #[tokio::test]
    async fn test_blank_job_id_is_rejected() {
        let (queue, _) = queue();
        let payload = ImportJobPayload::new(1, 2, "Ana", "file").with_job_id("  ");
        assert!(matches!(
            queue.enqueue_import(payload).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_live_job_id_cannot_be_queued_twice() {
        let (queue, jobs) = queue();
        let payload = ImportJobPayload::new(1, 2, "Ana", "file").with_job_id("job-1");

        queue.enqueue_import(payload.clone()).await.unwrap();
        assert!(matches!(
            queue.enqueue_import(payload.clone()).await,
            Err(AppError::InvalidInput(_))
        ));

        // Still rejected while the first copy runs
        jobs.dequeue(JobType::ContactImport).await.unwrap().unwrap();
        assert!(queue.enqueue_import(payload).await.is_err());
        assert_eq!(jobs.find_by_key("job-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_id_may_be_queued_again() {
        let (queue, jobs) = queue();
        let payload = ImportJobPayload::new(1, 2, "Ana", "file").with_job_id("job-2");

        let first = queue.enqueue_import(payload.clone()).await.unwrap();
        jobs.dequeue(JobType::ContactImport).await.unwrap().unwrap();
        jobs.mark_failed(first.id, "boom").await.unwrap();

        let second = queue.enqueue_import(payload).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_cancel_unknown_import_is_harmless() {
        let (queue, _) = queue();
        queue.cancel_import("never-queued").await;
        queue.cancel_import("never-queued").await;
        assert!(!queue.cancellation().is_cancelled("never-queued"));
        assert!(queue.cancellation().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_of_queued_import_is_recorded() {
        let (queue, _) = queue();
        let payload = ImportJobPayload::new(1, 2, "Ana", "file").with_job_id("job-3");
        queue.enqueue_import(payload).await.unwrap();

        queue.cancel_import("job-3").await;
        queue.cancel_import("job-3").await;
        assert!(queue.cancellation().is_cancelled("job-3"));
        assert_eq!(queue.cancellation().len(), 1);
    }

    #[tokio::test]
    async fn test_configured_batch_size_fills_unsized_payloads() {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let queue = JobQueue::new(jobs.clone(), Arc::new(CancellationRegistry::new()))
            .with_default_batch_size(20);

        queue
            .enqueue_validation_batch(ValidationBatchPayload::new(8, 1), None)
            .await
            .unwrap();
        queue
            .enqueue_validation_batch(ValidationBatchPayload::new(9, 1).with_batch_size(5), None)
            .await
            .unwrap();

        let mut sizes = Vec::new();
        while let Some(job) = jobs.dequeue(JobType::ContactValidationBatch).await.unwrap() {
            let payload: ValidationBatchPayload = job.parse_payload().unwrap();
            sizes.push((payload.contact_list_id, payload.batch_size));
        }
        sizes.sort();
        assert_eq!(sizes, vec![(8, Some(20)), (9, Some(5))]);
    }

    #[tokio::test]
    async fn test_validation_batch_is_delayed_and_deduplicated() {
        let (queue, jobs) = queue();
        let payload = ValidationBatchPayload::new(7, 1);

        let first = queue
            .enqueue_validation_batch(payload.clone(), Some(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(first.run_at > first.created_at);

        let second = queue.enqueue_validation_batch(payload, None).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(jobs.get_pending_jobs(None).await.unwrap().len(), 1);

        // Not due yet
        assert!(jobs.dequeue(JobType::ContactValidationBatch).await.unwrap().is_none());
    }
}
