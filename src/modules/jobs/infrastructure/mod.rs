pub mod memory;
pub mod models;
pub mod repository;

pub use memory::InMemoryJobRepository;
pub use repository::JobRepositoryImpl;
