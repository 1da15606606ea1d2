// Shared Kernel
// Cross-cutting pieces used by every bounded context

pub mod application; // Shared application layer patterns
pub mod config; // Environment-driven pipeline settings
pub mod database; // Diesel connection pool and migrations
pub mod errors; // Shared error types
pub mod utils; // Shared utilities

// Re-exports for convenience
pub use config::PipelineConfig;
pub use database::Database;
