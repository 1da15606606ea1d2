use crate::modules::contact_import::domain::entities::ImportJobStatus;
use serde::{Deserialize, Serialize};

/// Import job status enum matching database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::ImportJobStatus"]
#[serde(rename_all = "lowercase")]
pub enum ImportJobStatusDb {
    Queued,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

impl From<ImportJobStatusDb> for ImportJobStatus {
    fn from(status: ImportJobStatusDb) -> Self {
        match status {
            ImportJobStatusDb::Queued => ImportJobStatus::Queued,
            ImportJobStatusDb::Processing => ImportJobStatus::Processing,
            ImportJobStatusDb::Completed => ImportJobStatus::Completed,
            ImportJobStatusDb::Cancelled => ImportJobStatus::Cancelled,
            ImportJobStatusDb::Failed => ImportJobStatus::Failed,
        }
    }
}

impl From<ImportJobStatus> for ImportJobStatusDb {
    fn from(status: ImportJobStatus) -> Self {
        match status {
            ImportJobStatus::Queued => ImportJobStatusDb::Queued,
            ImportJobStatus::Processing => ImportJobStatusDb::Processing,
            ImportJobStatus::Completed => ImportJobStatusDb::Completed,
            ImportJobStatus::Cancelled => ImportJobStatusDb::Cancelled,
            ImportJobStatus::Failed => ImportJobStatusDb::Failed,
        }
    }
}
