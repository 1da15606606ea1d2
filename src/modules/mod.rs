pub mod contact_import;
pub mod contact_validation;
pub mod jobs;
pub mod realtime;
