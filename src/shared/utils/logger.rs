use log::{debug, error, info};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the logging system
/// Safe to call more than once; only the first call installs the logger, and an
/// already-installed global logger (e.g. from an embedding host) is left alone
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("contact_pipeline", log::LevelFilter::Debug)
            .filter_module("diesel", log::LevelFilter::Warn)
            .filter_module("reqwest", log::LevelFilter::Warn)
            .filter_module("tokio", log::LevelFilter::Warn)
            .format_timestamp_secs()
            .format_module_path(false)
            .try_init();

        info!("Logging system initialized");
    });
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

/// Structured logging helpers for common patterns
pub struct LogContext;

impl LogContext {
    /// Log database operations
    pub fn db_operation(operation: &str, table: &str, duration_ms: Option<u64>) {
        match duration_ms {
            Some(duration) => info!("DB: {} on {} completed in {}ms", operation, table, duration),
            None => debug!("DB: Starting {} on {}", operation, table),
        }
    }

    /// Log job lifecycle transitions
    pub fn job_transition(job_type: &str, job_id: &str, status: &str) {
        info!("Job: {} {} -> {}", job_type, job_id, status);
    }

    /// Cancellation is an expected outcome and never logged as an error
    pub fn cancellation(job_id: &str, stage: &str) {
        info!("Cancel: {} {}", job_id, stage);
    }

    /// Log batch progress for a contact list
    pub fn batch_progress(contact_list_id: i64, resolved: usize, selected: usize) {
        info!(
            "Validation: list {} resolved {}/{} rows in batch",
            contact_list_id, resolved, selected
        );
    }

    /// Log errors with context
    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!("{}: {}", context, error);
    }

    /// Log performance metrics
    pub fn performance_metric(operation: &str, duration_ms: u64, additional_info: Option<&str>) {
        match additional_info {
            Some(info) => info!(
                "Performance: {} took {}ms ({})",
                operation, duration_ms, info
            ),
            None => info!("Performance: {} took {}ms", operation, duration_ms),
        }
    }
}

/// Logs how long a handler invocation took once it is finished
pub struct TimedOperation {
    start: std::time::Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish_with_info(self, info: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        LogContext::performance_metric(&self.operation, duration, Some(info));
        duration
    }
}
