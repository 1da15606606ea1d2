/// Diesel-based implementation of ImportJobRepository
use crate::modules::contact_import::domain::entities::ImportJob;
use crate::modules::contact_import::domain::repository::ImportJobRepository;
use crate::modules::contact_import::domain::value_objects::ImportJobStatusDb;
use crate::modules::contact_import::infrastructure::models::{
    ImportJobCompletion, ImportJobModel, NewImportJob,
};
use crate::schema::import_jobs;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

pub struct ImportJobRepositoryImpl {
    pool: DbPool,
}

impl ImportJobRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }
}

#[async_trait]
impl ImportJobRepository for ImportJobRepositoryImpl {
    async fn create(&self, job: &ImportJob) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::insert_into(import_jobs::table)
            .values(&NewImportJob::from(job))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to create import job: {}", e)))?;

        LogContext::db_operation("INSERT", "import_jobs", None);
        Ok(())
    }

    async fn finalize(&self, job: &ImportJob) -> AppResult<bool> {
        let completion = ImportJobCompletion::from_job(job)?;
        let mut conn = self.get_conn()?;

        // Only a non-terminal row may receive the terminal write
        let updated = diesel::update(
            import_jobs::table.filter(import_jobs::id.eq(&job.id)).filter(
                import_jobs::status.eq_any(vec![
                    ImportJobStatusDb::Queued,
                    ImportJobStatusDb::Processing,
                ]),
            ),
        )
        .set(&completion)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to finalize import job: {}", e)))?;

        LogContext::db_operation("UPDATE", "import_jobs", None);
        Ok(updated > 0)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Option<ImportJob>> {
        let mut conn = self.get_conn()?;

        let model: Option<ImportJobModel> = import_jobs::table
            .find(id)
            .select(ImportJobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get import job: {}", e)))?;

        model.map(ImportJobModel::to_import_job).transpose()
    }

    async fn list_by_company(&self, company_id: i64, limit: i64) -> AppResult<Vec<ImportJob>> {
        let mut conn = self.get_conn()?;

        let models: Vec<ImportJobModel> = import_jobs::table
            .filter(import_jobs::company_id.eq(company_id))
            .order(import_jobs::started_at.desc())
            .limit(limit)
            .select(ImportJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to list import jobs: {}", e)))?;

        models.into_iter().map(ImportJobModel::to_import_job).collect()
    }

    async fn find_stale_processing(&self, started_before: DateTime<Utc>) -> AppResult<Vec<ImportJob>> {
        let mut conn = self.get_conn()?;

        let models: Vec<ImportJobModel> = import_jobs::table
            .filter(import_jobs::status.eq(ImportJobStatusDb::Processing))
            .filter(import_jobs::started_at.lt(started_before))
            .order(import_jobs::started_at.asc())
            .select(ImportJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to find stale import jobs: {}", e))
            })?;

        models.into_iter().map(ImportJobModel::to_import_job).collect()
    }
}
