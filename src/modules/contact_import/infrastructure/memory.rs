/// In-process implementation of ImportJobRepository
use crate::modules::contact_import::domain::entities::{ImportJob, ImportJobStatus};
use crate::modules::contact_import::domain::repository::ImportJobRepository;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryImportJobRepository {
    jobs: Mutex<HashMap<String, ImportJob>>,
}

impl InMemoryImportJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_jobs<T>(&self, f: impl FnOnce(&mut HashMap<String, ImportJob>) -> T) -> AppResult<T> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| AppError::InternalError("Import job store lock poisoned".to_string()))?;
        Ok(f(&mut jobs))
    }
}

#[async_trait]
impl ImportJobRepository for InMemoryImportJobRepository {
    async fn create(&self, job: &ImportJob) -> AppResult<()> {
        self.with_jobs(|jobs| {
            if jobs.contains_key(&job.id) {
                return Err(AppError::DatabaseError(format!(
                    "Import job {} already exists",
                    job.id
                )));
            }
            jobs.insert(job.id.clone(), job.clone());
            Ok(())
        })?
    }

    async fn finalize(&self, job: &ImportJob) -> AppResult<bool> {
        self.with_jobs(|jobs| match jobs.get_mut(&job.id) {
            Some(stored) if !stored.status.is_terminal() => {
                *stored = job.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(AppError::NotFound(format!("Import job {} not found", job.id))),
        })?
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Option<ImportJob>> {
        self.with_jobs(|jobs| jobs.get(id).cloned())
    }

    async fn list_by_company(&self, company_id: i64, limit: i64) -> AppResult<Vec<ImportJob>> {
        self.with_jobs(|jobs| {
            let mut found: Vec<ImportJob> = jobs
                .values()
                .filter(|j| j.company_id == company_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            found.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
            found
        })
    }

    async fn find_stale_processing(&self, started_before: DateTime<Utc>) -> AppResult<Vec<ImportJob>> {
        self.with_jobs(|jobs| {
            let mut found: Vec<ImportJob> = jobs
                .values()
                .filter(|j| j.status == ImportJobStatus::Processing && j.started_at < started_before)
                .cloned()
                .collect();
            found.sort_by(|a, b| a.started_at.cmp(&b.started_at));
            found
        })
    }
}
