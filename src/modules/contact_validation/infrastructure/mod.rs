pub mod http_number_checker;
pub mod memory;
pub mod models;
pub mod repository;

pub use http_number_checker::HttpNumberChecker;
pub use memory::InMemoryContactListItemRepository;
pub use repository::ContactListItemRepositoryImpl;
