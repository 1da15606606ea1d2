/// Background worker for contact import and validation batch jobs
///
/// Two lanes share the job queue:
/// - import lane: reserves an admission slot, claims an import, waits for the start window,
///   then runs the handler on its own task while holding the slot
/// - validation lane: claims due validation batches and runs them one at a time
use crate::modules::contact_import::application::command::ImportJobPayload;
use crate::modules::contact_import::application::handler::ImportJobHandler;
use crate::modules::contact_import::domain::entities::ImportJobStatus;
use crate::modules::contact_validation::application::command::ValidationBatchPayload;
use crate::modules::contact_validation::application::scheduler::ValidationBatchScheduler;
use crate::modules::jobs::admission::AdmissionLimiter;
use crate::modules::jobs::domain::entities::{JobRecord, JobType};
use crate::modules::jobs::domain::repository::JobRepository;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_error, log_info, log_warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Background worker that processes jobs from the queue
pub struct BackgroundWorker {
    job_repository: Arc<dyn JobRepository>,
    import_handler: Arc<ImportJobHandler>,
    validation_scheduler: Arc<ValidationBatchScheduler>,
    admission: Arc<AdmissionLimiter>,
    poll_interval: Duration,
    is_running: Arc<tokio::sync::RwLock<bool>>,
    active_imports: Arc<AtomicUsize>,
}

impl BackgroundWorker {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        import_handler: Arc<ImportJobHandler>,
        validation_scheduler: Arc<ValidationBatchScheduler>,
        admission: Arc<AdmissionLimiter>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            job_repository,
            import_handler,
            validation_scheduler,
            admission,
            poll_interval,
            is_running: Arc::new(tokio::sync::RwLock::new(false)),
            active_imports: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Spawn the worker on the tokio runtime
    ///
    /// The worker counts as running as soon as this returns, so an immediate `stop` is honored.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        if let Ok(mut running) = self.is_running.try_write() {
            *running = true;
        }

        let worker = self.clone();
        tokio::spawn(async move { worker.run_lanes().await })
    }

    /// Run both lanes on the current task until `stop` is called
    pub async fn run(self: Arc<Self>) {
        {
            let mut running = self.is_running.write().await;
            *running = true;
        }

        self.run_lanes().await;
    }

    async fn run_lanes(self: Arc<Self>) {
        log_info!("Background worker started");

        futures::join!(
            self.clone().run_import_lane(),
            self.clone().run_validation_lane()
        );

        log_info!("Background worker stopped");
    }

    /// Request a graceful stop; running imports finish on their own tasks
    pub async fn stop(&self) {
        let mut running = self.is_running.write().await;
        *running = false;
        log_info!("Background worker stop requested");
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    async fn run_import_lane(self: Arc<Self>) {
        while self.is_running().await {
            match self.claim_next_import().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    if e.is_transient() {
                        log_warn!("Import lane will retry after: {}", e);
                    } else {
                        log_error!("Error in import lane: {}", e);
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    async fn run_validation_lane(self: Arc<Self>) {
        while self.is_running().await {
            match self.process_next_validation().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    if e.is_transient() {
                        log_warn!("Validation lane will retry after: {}", e);
                    } else {
                        log_error!("Error in validation lane: {}", e);
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Claim one import and hand it to its own task.
    ///
    /// Returns true if a job was started, false if the queue was empty
    async fn claim_next_import(&self) -> AppResult<bool> {
        let permit = self.admission.reserve_slot().await?;

        if !self.is_running().await {
            return Ok(false);
        }

        let job = match self.job_repository.dequeue(JobType::ContactImport).await? {
            Some(job) => job,
            None => return Ok(false),
        };

        self.admission.wait_for_start().await;

        let payload: ImportJobPayload = match job.parse_payload() {
            Ok(payload) => payload,
            Err(e) => {
                let error = AppError::from(e);
                log_error!("Import job {} has an unreadable payload: {}", job.id, error);
                self.job_repository
                    .mark_failed(job.id, &error.to_string())
                    .await?;
                return Ok(true);
            }
        };

        log_info!(
            "Processing import {} (queue id {}, attempt {}/{})",
            payload.job_id,
            job.id,
            job.attempts,
            job.max_attempts
        );

        let handler = self.import_handler.clone();
        let jobs = self.job_repository.clone();
        let active = self.active_imports.clone();
        active.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            let outcome = handler.handle(payload).await;
            let result = match outcome.status {
                ImportJobStatus::Failed => Err(outcome
                    .error_message
                    .unwrap_or_else(|| "Import failed".to_string())),
                _ => Ok(()),
            };

            if let Err(e) = settle(jobs.as_ref(), &job, result).await {
                log_error!("Failed to settle import job {}: {}", job.id, e);
            }

            active.fetch_sub(1, Ordering::SeqCst);
            drop(permit);
        });

        Ok(true)
    }

    /// Run one due validation batch to completion.
    ///
    /// Returns true if a job was processed, false if nothing was due
    async fn process_next_validation(&self) -> AppResult<bool> {
        let job = match self
            .job_repository
            .dequeue(JobType::ContactValidationBatch)
            .await?
        {
            Some(job) => job,
            None => return Ok(false),
        };

        let result = match job.parse_payload::<ValidationBatchPayload>() {
            Ok(payload) => {
                log_debug!(
                    "Processing validation batch for list {} (queue id {})",
                    payload.contact_list_id,
                    job.id
                );
                let report = self.validation_scheduler.run_batch(payload).await;
                if report.aborted {
                    Err("Validation batch aborted; list resumes on next trigger".to_string())
                } else {
                    Ok(())
                }
            }
            Err(e) => Err(AppError::from(e).to_string()),
        };

        settle(self.job_repository.as_ref(), &job, result).await?;
        Ok(true)
    }

    /// Get worker statistics
    pub async fn get_statistics(&self) -> AppResult<WorkerStatistics> {
        let job_stats = self.job_repository.get_statistics().await?;
        let is_running = *self.is_running.read().await;

        Ok(WorkerStatistics {
            is_running,
            active_imports: self.active_imports.load(Ordering::SeqCst),
            available_import_slots: self.admission.available_slots(),
            pending_jobs: job_stats.pending_count,
            running_jobs: job_stats.running_count,
            completed_jobs: job_stats.completed_count,
            failed_jobs: job_stats.failed_count,
            total_jobs: job_stats.total_count,
        })
    }
}

/// Apply the queue policy of the job's type to a finished execution
async fn settle(
    jobs: &dyn JobRepository,
    job: &JobRecord,
    result: Result<(), String>,
) -> AppResult<()> {
    match result {
        Ok(()) => {
            let removes = job
                .parse_job_type()
                .map(|t| t.removes_on_complete())
                .unwrap_or(false);
            if removes {
                jobs.remove(job.id).await?;
            } else {
                jobs.mark_completed(job.id).await?;
            }
            log_debug!("Job {} finished", job.id);
        }
        Err(error) => {
            log_warn!("Job {} failed: {}", job.id, error);
            jobs.mark_failed(job.id, &error).await?;
        }
    }
    Ok(())
}

/// Worker statistics for monitoring
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WorkerStatistics {
    pub is_running: bool,
    pub active_imports: usize,
    pub available_import_slots: usize,
    pub pending_jobs: i64,
    pub running_jobs: i64,
    pub completed_jobs: i64,
    pub failed_jobs: i64,
    pub total_jobs: i64,
}
