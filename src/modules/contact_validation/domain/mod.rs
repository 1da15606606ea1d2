pub mod entities;
pub mod errors;
pub mod repository;

pub use entities::{ContactListItem, NewContactListItem, WhatsappValidity};
pub use errors::{NumberCheckError, TERMINAL_INVALID_CODES};
pub use repository::ContactListItemRepository;
