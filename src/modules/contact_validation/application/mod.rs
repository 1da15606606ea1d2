pub mod command;
pub mod ports;
pub mod scheduler;

pub use command::ValidationBatchPayload;
pub use ports::{BatchScheduler, NumberChecker};
pub use scheduler::{BatchReport, ValidationBatchScheduler};
