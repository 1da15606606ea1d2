/// Ports (interfaces) to collaborators of the import handler
///
/// Infrastructure or the embedding application implements these.
use super::progress::ImportProgressReporter;
use crate::modules::contact_import::domain::entities::ImportReport;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Everything the importer needs to parse and apply one file
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub company_id: i64,
    pub file_name: Option<String>,
    /// None selects the importer's no-file mode (re-sync)
    pub file: Option<Vec<u8>>,
    pub tag_mapping: Option<serde_json::Value>,
    pub whatsapp_id: Option<i64>,
    pub silent_mode: bool,
    pub dry_run: bool,
}

/// Handles the importer receives alongside the request
///
/// The importer must check `cancellation` between records and stop with
/// `ImportFailure::Cancelled` once it is set. Work in flight is never preempted.
#[derive(Clone)]
pub struct ImportContext {
    pub cancellation: CancellationToken,
    pub progress: ImportProgressReporter,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportFailure {
    #[error("Import cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait ContactImporter: Send + Sync {
    async fn import_contacts(
        &self,
        request: ImportRequest,
        context: ImportContext,
    ) -> Result<ImportReport, ImportFailure>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub company_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

/// Audit trail sink. Must return promptly; errors are logged and ignored by callers.
pub trait AuditLogger: Send + Sync {
    fn record(&self, entry: AuditEntry) -> AppResult<()>;
}

/// Error-monitoring sink for job-fatal failures
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &AppError, context: &str);
}
