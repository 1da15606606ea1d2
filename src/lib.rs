pub mod modules;
pub mod schema;
pub mod shared;

use modules::{
    contact_import::{
        application::{
            handler::ImportJobHandler,
            ports::{AuditLogger, ContactImporter, ErrorReporter},
        },
        domain::repository::ImportJobRepository,
        infrastructure::{
            ImportJobRepositoryImpl, InMemoryImportJobRepository, LogAuditLogger, LogErrorReporter,
        },
    },
    contact_validation::{
        application::{ports::NumberChecker, scheduler::ValidationBatchScheduler},
        domain::repository::ContactListItemRepository,
        infrastructure::{
            ContactListItemRepositoryImpl, HttpNumberChecker, InMemoryContactListItemRepository,
        },
    },
    jobs::{
        AdmissionLimiter, BackgroundWorker, CancellationRegistry, InMemoryJobRepository,
        JobQueue, JobRepository, JobRepositoryImpl,
    },
    realtime::TenantEventHub,
};
use shared::{
    errors::{AppError, AppResult},
    utils::logger::init_logger,
    Database, PipelineConfig,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Storage backends used by the pipeline
#[derive(Clone)]
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub import_jobs: Arc<dyn ImportJobRepository>,
    pub contact_items: Arc<dyn ContactListItemRepository>,
}

impl Repositories {
    /// Process-local storage; nothing survives a restart
    pub fn in_memory() -> Self {
        Self {
            jobs: Arc::new(InMemoryJobRepository::new()),
            import_jobs: Arc::new(InMemoryImportJobRepository::new()),
            contact_items: Arc::new(InMemoryContactListItemRepository::new()),
        }
    }

    pub fn postgres(database: &Database) -> Self {
        let pool = database.pool().clone();
        Self {
            jobs: Arc::new(JobRepositoryImpl::new(pool.clone())),
            import_jobs: Arc::new(ImportJobRepositoryImpl::new(pool.clone())),
            contact_items: Arc::new(ContactListItemRepositoryImpl::new(pool)),
        }
    }
}

/// External services the pipeline calls out to
#[derive(Clone)]
pub struct Collaborators {
    pub importer: Arc<dyn ContactImporter>,
    pub number_checker: Arc<dyn NumberChecker>,
    pub audit: Arc<dyn AuditLogger>,
    pub error_reporter: Arc<dyn ErrorReporter>,
}

impl Collaborators {
    /// Audit entries and job-fatal errors go to the log unless replaced
    pub fn new(importer: Arc<dyn ContactImporter>, number_checker: Arc<dyn NumberChecker>) -> Self {
        Self {
            importer,
            number_checker,
            audit: Arc::new(LogAuditLogger),
            error_reporter: Arc::new(LogErrorReporter),
        }
    }

    /// Use the HTTP messaging gateway configured by `NUMBER_CHECK_BASE_URL`
    pub fn from_config(importer: Arc<dyn ContactImporter>, config: &PipelineConfig) -> AppResult<Self> {
        let base_url = config.number_check_base_url.as_deref().ok_or_else(|| {
            AppError::InvalidInput("NUMBER_CHECK_BASE_URL is not configured".to_string())
        })?;

        Ok(Self::new(importer, Arc::new(HttpNumberChecker::new(base_url)?)))
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_error_reporter(mut self, error_reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = error_reporter;
        self
    }
}

/// Composition root: queue facade, event hub and the background worker wired together
pub struct Pipeline {
    queue: Arc<JobQueue>,
    events: Arc<TenantEventHub>,
    worker: Arc<BackgroundWorker>,
    repositories: Repositories,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Pipeline {
    /// Wire every component without starting the worker
    pub fn build(config: PipelineConfig, repositories: Repositories, collaborators: Collaborators) -> Self {
        let cancellation = Arc::new(CancellationRegistry::new());
        let events = Arc::new(TenantEventHub::default());
        let queue = Arc::new(
            JobQueue::new(repositories.jobs.clone(), cancellation.clone())
                .with_default_batch_size(config.validation.batch_size),
        );

        let import_handler = Arc::new(ImportJobHandler::new(
            repositories.import_jobs.clone(),
            collaborators.importer,
            cancellation,
            events.clone(),
            collaborators.audit,
            collaborators.error_reporter,
            config.import.clone(),
        ));

        let validation_scheduler = Arc::new(ValidationBatchScheduler::new(
            repositories.contact_items.clone(),
            collaborators.number_checker,
            queue.clone(),
            events.clone(),
            config.validation.clone(),
        ));

        let worker = Arc::new(BackgroundWorker::new(
            repositories.jobs.clone(),
            import_handler,
            validation_scheduler,
            Arc::new(AdmissionLimiter::from_config(&config.import)),
            config.worker.poll_interval,
        ));

        Self {
            queue,
            events,
            worker,
            repositories,
            worker_handle: Mutex::new(None),
        }
    }

    /// Build and start processing. Must be called inside a tokio runtime.
    pub fn start(config: PipelineConfig, repositories: Repositories, collaborators: Collaborators) -> Self {
        init_logger();

        let mut pipeline = Self::build(config, repositories, collaborators);
        let handle = pipeline.worker.start();
        pipeline.worker_handle = Mutex::new(Some(handle));
        pipeline
    }

    /// Start on Postgres storage, applying pending migrations first
    pub fn start_with_database(
        config: PipelineConfig,
        database: &Database,
        collaborators: Collaborators,
    ) -> AppResult<Self> {
        database.run_migrations()?;
        Ok(Self::start(config, Repositories::postgres(database), collaborators))
    }

    /// Stop claiming jobs and wait for the worker loop to exit
    pub async fn shutdown(&self) -> AppResult<()> {
        self.worker.stop().await;

        let handle = self.worker_handle.lock().await.take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| AppError::InternalError(format!("Worker task failed: {}", e)))?;
        }
        Ok(())
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    pub fn events(&self) -> &Arc<TenantEventHub> {
        &self.events
    }

    pub fn worker(&self) -> &Arc<BackgroundWorker> {
        &self.worker
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }
}
