pub mod memory;
pub mod models;
pub mod repository;
pub mod sinks;

pub use memory::InMemoryImportJobRepository;
pub use repository::ImportJobRepositoryImpl;
pub use sinks::{LogAuditLogger, LogErrorReporter};
