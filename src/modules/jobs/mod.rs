/// Background job system module
///
/// Provides a PostgreSQL-based job queue (with an in-memory twin) for the contact pipeline:
/// - Contact imports (admission limited, cooperatively cancellable)
/// - Contact list validation batches (self-rescheduling)
///
/// Architecture:
/// - Domain: Entities and repository trait
/// - Infrastructure: Diesel and in-memory repository implementations
/// - Admission / Cancellation: execution gates shared with the import handler
/// - Queue: enqueue/cancel facade used by callers
/// - Worker: Background worker that processes jobs
pub mod admission;
pub mod cancellation;
pub mod domain;
pub mod infrastructure;
pub mod queue;
pub mod worker;

pub use admission::{AdmissionLimiter, AdmissionPermit};
pub use cancellation::{CancellationGuard, CancellationRegistry};
pub use domain::{
    entities::{Job, JobRecord, JobStatus, JobType},
    repository::{JobRepository, JobStatistics},
};
pub use infrastructure::{InMemoryJobRepository, JobRepositoryImpl};
pub use queue::JobQueue;
pub use worker::{BackgroundWorker, WorkerStatistics};
