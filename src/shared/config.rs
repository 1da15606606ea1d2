/// Pipeline configuration
///
/// Values come from the process environment (a `.env` file is loaded first when present).
/// Every setting has a default so an empty environment yields a working in-memory pipeline.
use crate::shared::errors::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Admission and cancellation settings for import jobs
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Maximum number of import jobs executing at the same time
    pub max_concurrent: u32,
    /// Window over which at most `max_concurrent` imports may start
    pub admission_window: Duration,
    /// Cadence of the cooperative cancellation poll
    pub cancel_poll_interval: Duration,
    /// Optional cooperative deadline for a single import
    pub timeout: Option<Duration>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            admission_window: Duration::from_secs(5),
            cancel_poll_interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

/// Pacing settings for the number validation scanner
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub batch_size: u32,
    pub row_delay: Duration,
    pub reschedule_delay: Duration,
    /// Rows that failed transiently this many times are no longer selected. 0 disables the cap.
    pub max_transient_attempts: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            row_delay: Duration::from_millis(100),
            reschedule_delay: Duration::from_secs(5),
            max_transient_attempts: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub import: ImportConfig,
    pub validation: ValidationConfig,
    pub worker: WorkerConfig,
    pub number_check_base_url: Option<String>,
}

impl PipelineConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let import = ImportConfig {
            max_concurrent: parse_or(&lookup, "IMPORT_MAX_CONCURRENT", defaults.import.max_concurrent)?,
            admission_window: millis_or(
                &lookup,
                "IMPORT_ADMISSION_WINDOW_MS",
                defaults.import.admission_window,
            )?,
            cancel_poll_interval: millis_or(
                &lookup,
                "IMPORT_CANCEL_POLL_MS",
                defaults.import.cancel_poll_interval,
            )?,
            timeout: parse_opt::<u64, _>(&lookup, "IMPORT_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        if import.max_concurrent == 0 {
            return Err(AppError::InvalidInput(
                "IMPORT_MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }

        let validation = ValidationConfig {
            batch_size: parse_or(&lookup, "VALIDATION_BATCH_SIZE", defaults.validation.batch_size)?,
            row_delay: millis_or(&lookup, "VALIDATION_ROW_DELAY_MS", defaults.validation.row_delay)?,
            reschedule_delay: millis_or(
                &lookup,
                "VALIDATION_RESCHEDULE_DELAY_MS",
                defaults.validation.reschedule_delay,
            )?,
            max_transient_attempts: parse_or(
                &lookup,
                "VALIDATION_MAX_TRANSIENT_ATTEMPTS",
                defaults.validation.max_transient_attempts,
            )?,
        };

        if validation.batch_size == 0 {
            return Err(AppError::InvalidInput(
                "VALIDATION_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        let worker = WorkerConfig {
            poll_interval: millis_or(&lookup, "WORKER_POLL_INTERVAL_MS", defaults.worker.poll_interval)?,
        };

        Ok(Self {
            import,
            validation,
            worker,
            number_check_base_url: lookup("NUMBER_CHECK_BASE_URL").filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::InvalidInput(format!("{} has invalid value '{}': {}", key, raw, e))),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> AppResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt::<u64, _>(lookup, key)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}
