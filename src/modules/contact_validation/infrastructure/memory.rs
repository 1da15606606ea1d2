/// In-process implementation of ContactListItemRepository
use crate::modules::contact_validation::domain::entities::{ContactListItem, NewContactListItem};
use crate::modules::contact_validation::domain::repository::ContactListItemRepository;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Store {
    next_id: i64,
    rows: BTreeMap<i64, ContactListItem>,
}

/// Rows are kept in id order, which is also the selection order
#[derive(Default)]
pub struct InMemoryContactListItemRepository {
    store: Mutex<Store>,
}

impl InMemoryContactListItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> T) -> AppResult<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| AppError::InternalError("Contact row store lock poisoned".to_string()))?;
        Ok(f(&mut store))
    }

    /// Snapshot of every row of a list, ascending by id
    pub fn list_rows(&self, contact_list_id: i64) -> AppResult<Vec<ContactListItem>> {
        self.with_store(|store| {
            store
                .rows
                .values()
                .filter(|row| row.contact_list_id == contact_list_id)
                .cloned()
                .collect()
        })
    }

    fn selectable<'a>(
        store: &'a Store,
        contact_list_id: i64,
        company_id: i64,
        max_transient_attempts: u32,
    ) -> impl Iterator<Item = &'a ContactListItem> {
        store.rows.values().filter(move |row| {
            row.contact_list_id == contact_list_id
                && row.company_id == company_id
                && row.is_selectable(max_transient_attempts)
        })
    }

    fn resolve(&self, id: i64, valid: bool, number: Option<&str>, at: DateTime<Utc>) -> AppResult<bool> {
        self.with_store(|store| match store.rows.get_mut(&id) {
            Some(row) if row.is_whatsapp_valid.is_none() => {
                if let Some(number) = number {
                    row.number = number.to_string();
                }
                row.is_whatsapp_valid = Some(valid);
                row.validated_at = Some(at);
                true
            }
            _ => false,
        })
    }
}

#[async_trait]
impl ContactListItemRepository for InMemoryContactListItemRepository {
    async fn find_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        limit: u32,
        max_transient_attempts: u32,
    ) -> AppResult<Vec<ContactListItem>> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        self.with_store(|store| {
            Self::selectable(store, contact_list_id, company_id, max_transient_attempts)
                .take(limit)
                .cloned()
                .collect()
        })
    }

    async fn mark_valid(&self, id: i64, canonical_number: &str, at: DateTime<Utc>) -> AppResult<bool> {
        self.resolve(id, true, Some(canonical_number), at)
    }

    async fn mark_invalid(&self, id: i64, at: DateTime<Utc>) -> AppResult<bool> {
        self.resolve(id, false, None, at)
    }

    async fn record_transient_failure(&self, id: i64) -> AppResult<()> {
        self.with_store(|store| {
            if let Some(row) = store.rows.get_mut(&id) {
                if row.is_whatsapp_valid.is_none() {
                    row.validation_attempts = row.validation_attempts.saturating_add(1);
                }
            }
        })
    }

    async fn count_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        max_transient_attempts: u32,
    ) -> AppResult<i64> {
        self.with_store(|store| {
            let count = Self::selectable(store, contact_list_id, company_id, max_transient_attempts).count();
            i64::try_from(count).unwrap_or(i64::MAX)
        })
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<ContactListItem>> {
        self.with_store(|store| store.rows.get(&id).cloned())
    }

    async fn insert(&self, items: Vec<NewContactListItem>) -> AppResult<Vec<ContactListItem>> {
        self.with_store(|store| {
            items
                .into_iter()
                .map(|item| {
                    store.next_id += 1;
                    let row = ContactListItem {
                        id: store.next_id,
                        contact_list_id: item.contact_list_id,
                        company_id: item.company_id,
                        name: item.name,
                        number: item.number,
                        email: item.email,
                        is_whatsapp_valid: None,
                        validated_at: None,
                        validation_attempts: 0,
                    };
                    store.rows.insert(row.id, row.clone());
                    row
                })
                .collect()
        })
    }
}
