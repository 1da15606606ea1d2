/// Persistence port for the import job log
use crate::modules::contact_import::domain::entities::ImportJob;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    /// Insert the log row written at job pickup
    async fn create(&self, job: &ImportJob) -> AppResult<()>;

    /// Write the terminal state. Returns false when the stored row is already terminal,
    /// in which case nothing is written.
    async fn finalize(&self, job: &ImportJob) -> AppResult<bool>;

    async fn get_by_id(&self, id: &str) -> AppResult<Option<ImportJob>>;

    /// Import history for a company, newest first
    async fn list_by_company(&self, company_id: i64, limit: i64) -> AppResult<Vec<ImportJob>>;

    /// Rows still `processing` that started before the cutoff (crashed workers)
    async fn find_stale_processing(&self, started_before: DateTime<Utc>) -> AppResult<Vec<ImportJob>>;
}
