/// Diesel-based implementation of JobRepository
///
/// Uses PostgreSQL with SELECT FOR UPDATE SKIP LOCKED for atomic job dequeuing.
use crate::modules::jobs::domain::entities::{Job, JobRecord, JobType};
use crate::modules::jobs::domain::repository::{JobRepository, JobStatistics};
use crate::modules::jobs::domain::value_objects::JobStatusDb;
use crate::modules::jobs::infrastructure::models::{BackgroundJobModel, NewJob};
use crate::schema::background_jobs;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

const JOB_COLUMNS: &str = "id, job_type, job_key, payload, priority, status, attempts, \
     max_attempts, run_at, created_at, started_at, completed_at, error";

/// Helper struct for grouped COUNT queries
#[derive(QueryableByName)]
struct StatusCount {
    #[diesel(sql_type = diesel::sql_types::Text)]
    status: String,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

pub struct JobRepositoryImpl {
    pool: DbPool,
}

impl JobRepositoryImpl {
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
impl JobRepository for JobRepositoryImpl {
    async fn enqueue(&self, job: Job) -> AppResult<JobRecord> {
        let new_job = NewJob {
            job_type: job.job_type.to_string(),
            run_at: job.run_at(Utc::now()),
            job_key: job.job_key,
            payload: job.payload,
            priority: job.priority,
            max_attempts: job.max_attempts,
        };

        let mut conn = self.get_conn()?;

        let inserted: BackgroundJobModel = diesel::insert_into(background_jobs::table)
            .values(&new_job)
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to enqueue job: {}", e)))?;

        Ok(inserted.into())
    }

    async fn dequeue(&self, job_type: JobType) -> AppResult<Option<JobRecord>> {
        let mut conn = self.get_conn()?;

        // SKIP LOCKED keeps concurrent workers from claiming the same row
        let result: Option<BackgroundJobModel> = diesel::sql_query(format!(
            r#"
            UPDATE background_jobs
            SET status = 'running',
                started_at = NOW(),
                attempts = attempts + 1
            WHERE id = (
                SELECT id
                FROM background_jobs
                WHERE status = 'pending'
                  AND job_type = $1
                  AND run_at <= NOW()
                  AND attempts < max_attempts
                ORDER BY priority ASC, run_at ASC, created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind::<diesel::sql_types::Text, _>(job_type.to_string())
        .get_result(&mut conn)
        .optional()
        .map_err(|e| AppError::DatabaseError(format!("Failed to dequeue job: {}", e)))?;

        Ok(result.map(JobRecord::from))
    }

    async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(background_jobs::table.find(job_id))
            .set((
                background_jobs::status.eq(JobStatusDb::Completed),
                background_jobs::completed_at.eq(Some(Utc::now())),
            ))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to mark job as completed: {}", e)))?;

        Ok(())
    }

    async fn remove(&self, job_id: Uuid) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::delete(background_jobs::table.find(job_id))
            .execute(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to remove job: {}", e)))?;

        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let attempts: Option<(i32, i32)> = background_jobs::table
                .find(job_id)
                .select((background_jobs::attempts, background_jobs::max_attempts))
                .for_update()
                .first(conn)
                .optional()?;

            let Some((attempts, max_attempts)) = attempts else {
                return Ok(());
            };

            // Back to pending while attempts remain; otherwise keep the row as failed
            let (status, completed_at) = if attempts < max_attempts {
                (JobStatusDb::Pending, None)
            } else {
                (JobStatusDb::Failed, Some(Utc::now()))
            };

            diesel::update(background_jobs::table.find(job_id))
                .set((
                    background_jobs::status.eq(status),
                    background_jobs::completed_at.eq(completed_at),
                    background_jobs::started_at.eq(None::<chrono::DateTime<Utc>>),
                    background_jobs::error.eq(Some(error)),
                ))
                .execute(conn)?;

            Ok(())
        })
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark job as failed: {}", e)))
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        let mut conn = self.get_conn()?;

        let job: Option<BackgroundJobModel> = background_jobs::table
            .find(job_id)
            .select(BackgroundJobModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get job by id: {}", e)))?;

        Ok(job.map(JobRecord::from))
    }

    async fn find_by_key(&self, job_key: &str) -> AppResult<Vec<JobRecord>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<BackgroundJobModel> = background_jobs::table
            .filter(background_jobs::job_key.eq(job_key))
            .order(background_jobs::created_at.desc())
            .select(BackgroundJobModel::as_select())
            .load(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to get jobs by key: {}", e)))?;

        Ok(jobs.into_iter().map(JobRecord::from).collect())
    }

    async fn get_pending_jobs(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>> {
        let mut conn = self.get_conn()?;

        let jobs: Vec<BackgroundJobModel> = diesel::sql_query(format!(
            "SELECT {}
             FROM background_jobs
             WHERE status = 'pending'
               AND ($1::text IS NULL OR job_type = $1)
             ORDER BY priority ASC, run_at ASC, created_at ASC",
            JOB_COLUMNS
        ))
        .bind::<diesel::sql_types::Nullable<diesel::sql_types::Text>, _>(
            job_type.map(|t| t.to_string()),
        )
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to get pending jobs: {}", e)))?;

        Ok(jobs.into_iter().map(JobRecord::from).collect())
    }

    async fn delete_old_finished(&self, days: i32) -> AppResult<usize> {
        let mut conn = self.get_conn()?;

        let deleted = diesel::sql_query(
            "DELETE FROM background_jobs
             WHERE status IN ('completed', 'failed')
             AND completed_at < NOW() - INTERVAL '1 day' * $1",
        )
        .bind::<diesel::sql_types::Integer, _>(days)
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete old jobs: {}", e)))?;

        Ok(deleted)
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let mut conn = self.get_conn()?;

        let counts: Vec<StatusCount> = diesel::sql_query(
            "SELECT status::text AS status, COUNT(*) AS count
             FROM background_jobs
             GROUP BY status",
        )
        .load(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to count jobs: {}", e)))?;

        let mut stats = JobStatistics::default();
        for row in counts {
            match row.status.as_str() {
                "pending" => stats.pending_count = row.count,
                "running" => stats.running_count = row.count,
                "completed" => stats.completed_count = row.count,
                "failed" => stats.failed_count = row.count,
                _ => {}
            }
            stats.total_count += row.count;
        }

        Ok(stats)
    }
}
