/// Persistence port for contact list rows under validation
use crate::modules::contact_validation::domain::entities::{ContactListItem, NewContactListItem};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ContactListItemRepository: Send + Sync {
    /// Up to `limit` unresolved rows of the list, ascending by id. Rows whose transient
    /// attempts reached `max_transient_attempts` are skipped (0 disables the ceiling).
    async fn find_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        limit: u32,
        max_transient_attempts: u32,
    ) -> AppResult<Vec<ContactListItem>>;

    /// Resolve as reachable and store the canonical number. No-op (false) if already resolved.
    async fn mark_valid(&self, id: i64, canonical_number: &str, at: DateTime<Utc>) -> AppResult<bool>;

    /// Resolve as invalid. No-op (false) if already resolved.
    async fn mark_invalid(&self, id: i64, at: DateTime<Utc>) -> AppResult<bool>;

    /// Count one more transient failure; validity stays unresolved
    async fn record_transient_failure(&self, id: i64) -> AppResult<()>;

    /// Rows a future batch would still select
    async fn count_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        max_transient_attempts: u32,
    ) -> AppResult<i64>;

    async fn get_by_id(&self, id: i64) -> AppResult<Option<ContactListItem>>;

    async fn insert(&self, items: Vec<NewContactListItem>) -> AppResult<Vec<ContactListItem>>;
}
