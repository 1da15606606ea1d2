/// Value objects for jobs domain
use crate::modules::jobs::domain::entities::JobStatus;
use serde::{Deserialize, Serialize};

/// Job status enum matching database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::JobStatus"]
#[serde(rename_all = "lowercase")]
pub enum JobStatusDb {
    Pending,
    Running,
    Completed,
    Failed,
}

impl From<JobStatusDb> for JobStatus {
    fn from(status: JobStatusDb) -> Self {
        match status {
            JobStatusDb::Pending => JobStatus::Pending,
            JobStatusDb::Running => JobStatus::Running,
            JobStatusDb::Completed => JobStatus::Completed,
            JobStatusDb::Failed => JobStatus::Failed,
        }
    }
}

impl std::fmt::Display for JobStatusDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        JobStatus::from(*self).fmt(f)
    }
}
