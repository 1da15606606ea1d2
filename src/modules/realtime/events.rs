/// Tenant-scoped real-time events published by the pipeline
use crate::modules::contact_import::domain::entities::{ImportJobStatus, ImportSummary};
use serde::{Deserialize, Serialize};

/// Status change of an import job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatusEvent {
    pub job_id: String,
    pub status: ImportJobStatus,
    /// 0..=100
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ImportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of one validation batch for a contact list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationProgressEvent {
    pub contact_list_id: i64,
    pub validated: usize,
    pub invalid: usize,
    pub errors: usize,
    pub remaining: i64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ProgressEvent {
    ImportStatus(ImportStatusEvent),
    ContactListValidation(ValidationProgressEvent),
}

impl ProgressEvent {
    /// Channel name subscribers listen on
    pub fn channel(&self) -> &'static str {
        match self {
            ProgressEvent::ImportStatus(_) => "import-status",
            ProgressEvent::ContactListValidation(_) => "contact-list-validation",
        }
    }
}
