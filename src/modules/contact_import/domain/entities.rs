/// Import job log entities
///
/// One `ImportJob` row exists per executed import. It is created when a worker picks the
/// job up and receives exactly one terminal write.
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportJobStatus {
    Queued,
    Processing,
    Completed,
    Cancelled,
    Failed,
}

impl ImportJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportJobStatus::Completed | ImportJobStatus::Cancelled | ImportJobStatus::Failed
        )
    }

    /// Status only moves forward: queued -> processing -> {completed | cancelled | failed}
    pub fn can_transition_to(&self, next: ImportJobStatus) -> bool {
        match self {
            ImportJobStatus::Queued => next != ImportJobStatus::Queued,
            ImportJobStatus::Processing => next.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ImportJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportJobStatus::Queued => write!(f, "queued"),
            ImportJobStatus::Processing => write!(f, "processing"),
            ImportJobStatus::Completed => write!(f, "completed"),
            ImportJobStatus::Cancelled => write!(f, "cancelled"),
            ImportJobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ImportJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(ImportJobStatus::Queued),
            "processing" => Ok(ImportJobStatus::Processing),
            "completed" => Ok(ImportJobStatus::Completed),
            "cancelled" => Ok(ImportJobStatus::Cancelled),
            "failed" => Ok(ImportJobStatus::Failed),
            _ => Err(format!("Invalid import job status: {}", s)),
        }
    }
}

/// A record the importer could not apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecordError {
    pub record: serde_json::Value,
    pub error: String,
}

/// What the contact importer reports back for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: u32,
    pub created: u32,
    pub updated: u32,
    pub tagged: u32,
    pub failed: Vec<ImportRecordError>,
}

/// How an import run ended, before it is written to the job log
#[derive(Debug, Clone, PartialEq)]
pub enum ImportTermination {
    Completed(ImportReport),
    /// Partial results may already have been applied when the stop was observed
    Cancelled(Option<ImportReport>),
    Failed(String),
}

/// Summary sent to clients with the terminal status event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total: i32,
    pub created: i32,
    pub updated: i32,
    pub tagged: i32,
    pub failed: i32,
    pub execution_time_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJob {
    pub id: String,
    pub company_id: i64,
    pub user_id: i64,
    pub source: String,
    pub file_name: Option<String>,
    pub status: ImportJobStatus,
    pub total_records: i32,
    pub processed_records: i32,
    pub created_records: i32,
    pub updated_records: i32,
    pub tagged_records: i32,
    pub failed_records: i32,
    pub errors: Vec<ImportRecordError>,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub execution_time_seconds: Option<i32>,
}

fn count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl ImportJob {
    /// New log row for a job that has just been picked up
    pub fn start(
        id: impl Into<String>,
        company_id: i64,
        user_id: i64,
        source: impl Into<String>,
        file_name: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id,
            user_id,
            source: source.into(),
            file_name,
            status: ImportJobStatus::Processing,
            total_records: 0,
            processed_records: 0,
            created_records: 0,
            updated_records: 0,
            tagged_records: 0,
            failed_records: 0,
            errors: Vec::new(),
            error_message: None,
            started_at: now,
            completed_at: None,
            execution_time_seconds: None,
        }
    }

    /// Apply the single terminal write; counters are frozen afterwards
    pub fn finalize(&mut self, termination: ImportTermination, now: DateTime<Utc>) -> AppResult<()> {
        let (status, report, error_message) = match termination {
            ImportTermination::Completed(report) => (ImportJobStatus::Completed, Some(report), None),
            ImportTermination::Cancelled(report) => (
                ImportJobStatus::Cancelled,
                report,
                Some("Import cancelled by user".to_string()),
            ),
            ImportTermination::Failed(message) => (ImportJobStatus::Failed, None, Some(message)),
        };

        if !self.status.can_transition_to(status) {
            return Err(AppError::ValidationError(format!(
                "Import job {} cannot move from {} to {}",
                self.id, self.status, status
            )));
        }

        if let Some(report) = report {
            let failed = u32::try_from(report.failed.len()).unwrap_or(u32::MAX);
            self.total_records = count(report.total);
            self.created_records = count(report.created);
            self.updated_records = count(report.updated);
            self.tagged_records = count(report.tagged);
            self.failed_records = count(failed);
            self.processed_records =
                count(report.created.saturating_add(report.updated).saturating_add(failed));
            self.errors = report.failed;
        }

        let elapsed = (now - self.started_at).num_milliseconds().max(0);
        self.execution_time_seconds = Some(i32::try_from((elapsed + 500) / 1000).unwrap_or(i32::MAX));
        self.status = status;
        self.error_message = error_message;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            total: self.total_records,
            created: self.created_records,
            updated: self.updated_records,
            tagged: self.tagged_records,
            failed: self.failed_records,
            execution_time_seconds: self.execution_time_seconds,
        }
    }
}
