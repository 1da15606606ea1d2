pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{
    ImportJob, ImportJobStatus, ImportRecordError, ImportReport, ImportSummary, ImportTermination,
};
pub use repository::ImportJobRepository;
pub use value_objects::ImportJobStatusDb;
