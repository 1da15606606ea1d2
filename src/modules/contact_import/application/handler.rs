/// Import job handler
///
/// Runs one queued contact import from pickup to its terminal state:
/// persist `processing` -> poll for cancellation while the importer runs ->
/// persist the terminal state -> clear the cancellation entry -> emit -> audit.
///
/// Job-fatal errors end up in the job log, the status event and the error reporter;
/// they are never propagated to the queue.
use super::command::ImportJobPayload;
use super::ports::{
    AuditEntry, AuditLogger, ContactImporter, ErrorReporter, ImportContext, ImportFailure,
    ImportRequest,
};
use super::progress::ImportProgressReporter;
use crate::modules::contact_import::domain::entities::{
    ImportJob, ImportJobStatus, ImportTermination,
};
use crate::modules::contact_import::domain::repository::ImportJobRepository;
use crate::modules::jobs::cancellation::{CancellationGuard, CancellationRegistry};
use crate::modules::realtime::{ImportStatusEvent, ProgressEmitter, ProgressEvent};
use crate::shared::application::use_case::UseCase;
use crate::shared::config::ImportConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::log_warn;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Why the poll asked the importer to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    CancelRequested,
    DeadlineExceeded,
}

pub struct ImportJobHandler {
    import_jobs: Arc<dyn ImportJobRepository>,
    importer: Arc<dyn ContactImporter>,
    cancellation: Arc<CancellationRegistry>,
    emitter: Arc<dyn ProgressEmitter>,
    audit: Arc<dyn AuditLogger>,
    error_reporter: Arc<dyn ErrorReporter>,
    config: ImportConfig,
}

impl ImportJobHandler {
    pub fn new(
        import_jobs: Arc<dyn ImportJobRepository>,
        importer: Arc<dyn ContactImporter>,
        cancellation: Arc<CancellationRegistry>,
        emitter: Arc<dyn ProgressEmitter>,
        audit: Arc<dyn AuditLogger>,
        error_reporter: Arc<dyn ErrorReporter>,
        config: ImportConfig,
    ) -> Self {
        Self {
            import_jobs,
            importer,
            cancellation,
            emitter,
            audit,
            error_reporter,
            config,
        }
    }

    /// Run one import job to a terminal state and return the final log row
    pub async fn handle(&self, payload: ImportJobPayload) -> ImportJob {
        let timer = TimedOperation::new("contact_import");

        let mut job = ImportJob::start(
            payload.job_id.clone(),
            payload.company_id,
            payload.user_id,
            payload.source.clone(),
            payload.file_name.clone(),
            Utc::now(),
        );

        if let Err(e) = self.import_jobs.create(&job).await {
            let _ = job.finalize(ImportTermination::Failed(e.to_string()), Utc::now());

            // Another execution owns this id; its registry entry and status channel are left alone
            if let Ok(Some(_)) = self.import_jobs.get_by_id(&job.id).await {
                log_warn!("Import job {} already has a log row; duplicate run skipped", job.id);
                self.error_reporter
                    .report(&e, &format!("Duplicate execution of import job {}", job.id));
                return job;
            }

            // No log row to finalize; report and surface the failure on the status channel
            self.error_reporter
                .report(&e, &format!("Failed to create import job log {}", job.id));
            self.cancellation.clear(&job.id);
            self.emit_terminal(&job);
            return job;
        }

        let cleanup = CancellationGuard::new(&self.cancellation, &payload.job_id);
        LogContext::job_transition("contact_import", &job.id, "processing");
        self.emit_status(&job, 0);

        let termination = self.run_importer(&payload).await;

        if let Err(e) = job.finalize(termination, Utc::now()) {
            self.error_reporter.report(&e, "Import job finalization rejected");
        } else {
            match self.import_jobs.finalize(&job).await {
                Ok(true) => {}
                Ok(false) => log_warn!(
                    "Import job {} was already terminal in storage; terminal write skipped",
                    job.id
                ),
                Err(e) => self
                    .error_reporter
                    .report(&e, &format!("Failed to persist terminal state of {}", job.id)),
            }
        }

        drop(cleanup);
        LogContext::job_transition("contact_import", &job.id, &job.status.to_string());

        self.emit_terminal(&job);
        self.write_audit(&payload, &job);

        if job.status == ImportJobStatus::Failed {
            let message = job.error_message.clone().unwrap_or_default();
            self.error_reporter.report(
                &AppError::ExternalServiceError(message),
                &format!("Import job {} failed", job.id),
            );
        }

        timer.finish_with_info(&format!("{} {}", job.id, job.status));
        job
    }

    /// Invoke the importer once while polling for stop requests
    async fn run_importer(&self, payload: &ImportJobPayload) -> ImportTermination {
        let job_id = payload.job_id.as_str();

        // Cancelled before pickup: never touch contact rows
        if self.cancellation.is_cancelled(job_id) {
            LogContext::cancellation(job_id, "observed before pickup; importer not called");
            return ImportTermination::Cancelled(None);
        }

        let token = CancellationToken::new();
        let context = ImportContext {
            cancellation: token.clone(),
            progress: ImportProgressReporter::new(
                self.emitter.clone(),
                payload.company_id,
                job_id,
            ),
        };
        let request = ImportRequest {
            company_id: payload.company_id,
            file_name: payload.file_name.clone(),
            file: payload.file_blob.clone(),
            tag_mapping: payload.tag_mapping.clone(),
            whatsapp_id: payload.whatsapp_id,
            silent_mode: payload.silent_mode,
            dry_run: payload.dry_run,
        };

        let import = self.importer.import_contacts(request, context);
        tokio::pin!(import);
        let poll = self.poll_for_stop(job_id, Instant::now());
        tokio::pin!(poll);

        let mut stop_reason = None;
        let result = tokio::select! {
            result = &mut import => result,
            reason = &mut poll => {
                match reason {
                    StopReason::CancelRequested => {
                        LogContext::cancellation(job_id, "observed while running; waiting for checkpoint")
                    }
                    StopReason::DeadlineExceeded => {
                        log_warn!("Import job {} passed its deadline; waiting for checkpoint", job_id)
                    }
                }
                stop_reason = Some(reason);
                token.cancel();
                import.await
            }
        };

        let cancel_requested = stop_reason == Some(StopReason::CancelRequested)
            || self.cancellation.is_cancelled(job_id);
        let timed_out = stop_reason == Some(StopReason::DeadlineExceeded);

        match result {
            Ok(report) if cancel_requested => ImportTermination::Cancelled(Some(report)),
            Ok(report) => ImportTermination::Completed(report),
            Err(_) if cancel_requested => ImportTermination::Cancelled(None),
            Err(ImportFailure::Cancelled) if timed_out => ImportTermination::Failed(format!(
                "Import timed out after {:?}",
                self.config.timeout.unwrap_or_default()
            )),
            Err(ImportFailure::Cancelled) => ImportTermination::Cancelled(None),
            Err(ImportFailure::Failed(message)) => ImportTermination::Failed(message),
        }
    }

    /// Resolves once cancellation was requested or the optional deadline passed
    async fn poll_for_stop(&self, job_id: &str, started: Instant) -> StopReason {
        let mut ticker = tokio::time::interval(self.config.cancel_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if self.cancellation.is_cancelled(job_id) {
                return StopReason::CancelRequested;
            }
            if let Some(timeout) = self.config.timeout {
                if started.elapsed() >= timeout {
                    return StopReason::DeadlineExceeded;
                }
            }
        }
    }

    fn emit_status(&self, job: &ImportJob, progress: u8) {
        self.emitter.emit(
            job.company_id,
            ProgressEvent::ImportStatus(ImportStatusEvent {
                job_id: job.id.clone(),
                status: job.status,
                progress,
                result: None,
                error: None,
            }),
        );
    }

    fn emit_terminal(&self, job: &ImportJob) {
        let (progress, result, error) = match job.status {
            ImportJobStatus::Completed => (100, Some(job.summary()), None),
            ImportJobStatus::Cancelled => (0, Some(job.summary()), job.error_message.clone()),
            _ => (0, None, job.error_message.clone()),
        };

        self.emitter.emit(
            job.company_id,
            ProgressEvent::ImportStatus(ImportStatusEvent {
                job_id: job.id.clone(),
                status: job.status,
                progress,
                result,
                error,
            }),
        );
    }

    fn write_audit(&self, payload: &ImportJobPayload, job: &ImportJob) {
        let entry = AuditEntry {
            company_id: payload.company_id,
            user_id: payload.user_id,
            user_name: payload.user_name.clone(),
            action: format!("contacts.import.{}", job.status),
            entity: "ImportJob".to_string(),
            entity_id: job.id.clone(),
            details: serde_json::json!({
                "source": payload.source,
                "fileName": payload.file_name,
                "dryRun": payload.dry_run,
                "summary": job.summary(),
            }),
            occurred_at: Utc::now(),
        };

        if let Err(e) = self.audit.record(entry) {
            log_warn!("Audit entry for import job {} was not recorded: {}", job.id, e);
        }
    }
}

#[async_trait]
impl UseCase<ImportJobPayload, ImportJob> for ImportJobHandler {
    async fn execute(&self, command: ImportJobPayload) -> AppResult<ImportJob> {
        Ok(self.handle(command).await)
    }
}
