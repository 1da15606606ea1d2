/// Test helpers for building pipelines and waiting on asynchronous outcomes
use contact_pipeline::modules::contact_import::domain::entities::ImportJob;
use contact_pipeline::shared::config::{ImportConfig, PipelineConfig, ValidationConfig, WorkerConfig};
use contact_pipeline::Repositories;
use std::future::Future;
use std::time::Duration;

/// Production semantics at test speed: no start window, millisecond polls and delays
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        import: ImportConfig {
            max_concurrent: 2,
            admission_window: Duration::ZERO,
            cancel_poll_interval: Duration::from_millis(10),
            timeout: None,
        },
        validation: ValidationConfig {
            batch_size: 50,
            row_delay: Duration::ZERO,
            reschedule_delay: Duration::from_millis(10),
            max_transient_attempts: 10,
        },
        worker: WorkerConfig {
            poll_interval: Duration::from_millis(10),
        },
        number_check_base_url: None,
    }
}

/// Poll `condition` until it yields a value or `timeout` passes
pub async fn wait_for<T, F, Fut>(timeout: Duration, mut condition: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(value) = condition().await {
            return Some(value);
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Wait until the import log row for `job_id` reached a terminal state
pub async fn wait_for_terminal_import(repositories: &Repositories, job_id: &str) -> ImportJob {
    let import_jobs = repositories.import_jobs.clone();
    let job_id = job_id.to_string();

    wait_for(Duration::from_secs(10), || {
        let import_jobs = import_jobs.clone();
        let job_id = job_id.clone();
        async move {
            import_jobs
                .get_by_id(&job_id)
                .await
                .ok()
                .flatten()
                .filter(|job| job.status.is_terminal())
        }
    })
    .await
    .unwrap_or_else(|| panic!("Import {} never reached a terminal state", job_id))
}
