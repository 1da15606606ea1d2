/// Contact import: runs queued file imports and keeps the import job log
pub mod application;
pub mod domain;
pub mod infrastructure;
