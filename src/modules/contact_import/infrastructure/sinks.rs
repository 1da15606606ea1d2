/// Log-backed audit and error-report sinks
///
/// Default collaborators when the embedding application does not wire its own.
use crate::modules::contact_import::application::ports::{AuditEntry, AuditLogger, ErrorReporter};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use crate::log_info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditLogger;

impl AuditLogger for LogAuditLogger {
    fn record(&self, entry: AuditEntry) -> AppResult<()> {
        let details = serde_json::to_string(&entry.details)?;
        log_info!(
            "AUDIT company={} user={}({}) {} {}:{} {}",
            entry.company_id,
            entry.user_id,
            entry.user_name,
            entry.action,
            entry.entity,
            entry.entity_id,
            details
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorReporter;

impl ErrorReporter for LogErrorReporter {
    fn report(&self, error: &AppError, context: &str) {
        LogContext::error_with_context(error, context);
    }
}
