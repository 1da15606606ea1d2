pub mod command;
pub mod handler;
pub mod ports;
pub mod progress;

pub use command::ImportJobPayload;
pub use handler::ImportJobHandler;
pub use ports::{
    AuditEntry, AuditLogger, ContactImporter, ErrorReporter, ImportContext, ImportFailure,
    ImportRequest,
};
pub use progress::ImportProgressReporter;
