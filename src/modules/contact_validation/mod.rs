/// Contact list number validation: paced, self-rescheduling batches against the messaging gateway
pub mod application;
pub mod domain;
pub mod infrastructure;
