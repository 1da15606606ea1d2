/// Job repository tests
///
/// The same queue contract is checked against the in-memory store and, when
/// `TEST_DATABASE_URL` is set, against PostgreSQL.
mod utils;

use contact_pipeline::modules::contact_validation::application::command::ValidationBatchPayload;
use contact_pipeline::modules::jobs::{
    InMemoryJobRepository, Job, JobRepository, JobRepositoryImpl, JobStatus, JobType,
};
use std::time::Duration;
use utils::db::{acquire_test_lock, clean_test_db, test_pool};
use utils::factories::{import_payload, COMPANY_ID};

fn import_job(job_id: &str) -> Job {
    Job::new(JobType::ContactImport, &import_payload(job_id))
        .unwrap()
        .with_key(job_id)
}

fn validation_job(list_id: i64) -> Job {
    let payload = ValidationBatchPayload::new(list_id, COMPANY_ID);
    Job::new(JobType::ContactValidationBatch, &payload)
        .unwrap()
        .with_key(payload.job_key())
}

async fn claims_by_priority_and_type(repo: &dyn JobRepository) {
    let low = repo.enqueue(import_job("low").with_priority(10)).await.unwrap();
    let high = repo.enqueue(import_job("high").with_priority(1)).await.unwrap();
    assert_eq!(low.status, JobStatus::Pending.to_string());
    assert_eq!(low.attempts, 0);

    assert!(repo
        .dequeue(JobType::ContactValidationBatch)
        .await
        .unwrap()
        .is_none());

    let first = repo.dequeue(JobType::ContactImport).await.unwrap().unwrap();
    assert_eq!(first.id, high.id);
    assert_eq!(first.status, JobStatus::Running.to_string());
    assert_eq!(first.attempts, 1);
    assert!(first.started_at.is_some());

    let second = repo.dequeue(JobType::ContactImport).await.unwrap().unwrap();
    assert_eq!(second.id, low.id);

    assert!(repo.dequeue(JobType::ContactImport).await.unwrap().is_none());
}

async fn delayed_jobs_are_not_due(repo: &dyn JobRepository) {
    let delayed = repo
        .enqueue(validation_job(1).with_delay(Duration::from_secs(3600)))
        .await
        .unwrap();
    assert!(delayed.run_at > delayed.created_at);

    assert!(repo
        .dequeue(JobType::ContactValidationBatch)
        .await
        .unwrap()
        .is_none());

    let pending = repo
        .get_pending_jobs(Some(JobType::ContactValidationBatch))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, delayed.id);
}

async fn failures_retry_until_attempts_run_out(repo: &dyn JobRepository) {
    let job = repo
        .enqueue(validation_job(2).with_max_attempts(2))
        .await
        .unwrap();

    let claimed = repo
        .dequeue(JobType::ContactValidationBatch)
        .await
        .unwrap()
        .unwrap();
    repo.mark_failed(claimed.id, "checker unreachable").await.unwrap();

    let retried = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(retried.status, JobStatus::Pending.to_string());
    assert_eq!(retried.error.as_deref(), Some("checker unreachable"));
    assert!(retried.completed_at.is_none());

    let claimed = repo
        .dequeue(JobType::ContactValidationBatch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.attempts, 2);
    repo.mark_failed(claimed.id, "still unreachable").await.unwrap();

    let failed = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed.to_string());
    assert!(failed.completed_at.is_some());
    assert!(repo
        .dequeue(JobType::ContactValidationBatch)
        .await
        .unwrap()
        .is_none());
}

async fn completion_policies_and_statistics(repo: &dyn JobRepository) {
    let kept = repo.enqueue(validation_job(3)).await.unwrap();
    let removed = repo.enqueue(import_job("gone")).await.unwrap();
    repo.enqueue(import_job("waiting")).await.unwrap();

    repo.mark_completed(kept.id).await.unwrap();
    repo.remove(removed.id).await.unwrap();

    assert!(repo.get_by_id(removed.id).await.unwrap().is_none());
    assert!(repo.find_by_key("gone").await.unwrap().is_empty());

    let by_key = repo
        .find_by_key(&ValidationBatchPayload::new(3, COMPANY_ID).job_key())
        .await
        .unwrap();
    assert_eq!(by_key.len(), 1);
    assert_eq!(by_key[0].status, JobStatus::Completed.to_string());

    let stats = repo.get_statistics().await.unwrap();
    assert_eq!(stats.pending_count, 1);
    assert_eq!(stats.completed_count, 1);
    assert_eq!(stats.running_count, 0);
    assert_eq!(stats.failed_count, 0);
    assert_eq!(stats.total_count, 2);

    // Recently finished jobs survive the retention sweep
    assert_eq!(repo.delete_old_finished(30).await.unwrap(), 0);
    assert!(repo.get_by_id(kept.id).await.unwrap().is_some());
}

async fn find_by_key_returns_newest_first(repo: &dyn JobRepository) {
    let older = repo.enqueue(validation_job(4)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = repo.enqueue(validation_job(4)).await.unwrap();

    let jobs = repo
        .find_by_key(&ValidationBatchPayload::new(4, COMPANY_ID).job_key())
        .await
        .unwrap();
    let ids: Vec<_> = jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

// ================================================================================================
// IN-MEMORY
// ================================================================================================

#[tokio::test]
async fn in_memory_claims_by_priority_and_type() {
    claims_by_priority_and_type(&InMemoryJobRepository::new()).await;
}

#[tokio::test]
async fn in_memory_delayed_jobs_are_not_due() {
    delayed_jobs_are_not_due(&InMemoryJobRepository::new()).await;
}

#[tokio::test]
async fn in_memory_failures_retry_until_attempts_run_out() {
    failures_retry_until_attempts_run_out(&InMemoryJobRepository::new()).await;
}

#[tokio::test]
async fn in_memory_completion_policies_and_statistics() {
    completion_policies_and_statistics(&InMemoryJobRepository::new()).await;
}

#[tokio::test]
async fn in_memory_find_by_key_returns_newest_first() {
    find_by_key_returns_newest_first(&InMemoryJobRepository::new()).await;
}

#[tokio::test]
async fn in_memory_old_finished_jobs_are_swept() {
    let repo = InMemoryJobRepository::new();
    let done = repo.enqueue(validation_job(5)).await.unwrap();
    let pending = repo.enqueue(validation_job(6)).await.unwrap();
    repo.mark_completed(done.id).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(repo.delete_old_finished(0).await.unwrap(), 1);

    assert!(repo.get_by_id(done.id).await.unwrap().is_none());
    assert!(repo.get_by_id(pending.id).await.unwrap().is_some());
}

// ================================================================================================
// POSTGRES
// ================================================================================================

/// Runs `check` on a clean database, or skips when no test database is configured
macro_rules! postgres_test {
    ($name:ident, $check:ident) => {
        #[tokio::test]
        async fn $name() {
            let Some(pool) = test_pool() else {
                eprintln!("TEST_DATABASE_URL not set; skipping {}", stringify!($name));
                return;
            };
            let _lock = acquire_test_lock();
            clean_test_db(&pool);

            $check(&JobRepositoryImpl::new(pool)).await;
        }
    };
}

postgres_test!(postgres_claims_by_priority_and_type, claims_by_priority_and_type);
postgres_test!(postgres_delayed_jobs_are_not_due, delayed_jobs_are_not_due);
postgres_test!(
    postgres_failures_retry_until_attempts_run_out,
    failures_retry_until_attempts_run_out
);
postgres_test!(
    postgres_completion_policies_and_statistics,
    completion_policies_and_statistics
);
postgres_test!(
    postgres_find_by_key_returns_newest_first,
    find_by_key_returns_newest_first
);
