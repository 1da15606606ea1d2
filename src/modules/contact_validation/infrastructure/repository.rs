/// Diesel-based implementation of ContactListItemRepository
///
/// Resolution updates are guarded by `is_whatsapp_valid IS NULL`, so a resolved row is
/// never written twice.
use crate::modules::contact_validation::domain::entities::{ContactListItem, NewContactListItem};
use crate::modules::contact_validation::domain::repository::ContactListItemRepository;
use crate::modules::contact_validation::infrastructure::models::{
    ContactListItemModel, NewContactListItemModel,
};
use crate::schema::contact_list_items;
use crate::shared::database::{DbConnection, DbPool};
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;

type BoxedItems<'a> = contact_list_items::BoxedQuery<'a, Pg>;

pub struct ContactListItemRepositoryImpl {
    pool: DbPool,
}

impl ContactListItemRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> AppResult<DbConnection> {
        self.pool
            .get()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get connection: {}", e)))
    }

    /// Unresolved rows of one list, optionally without rows past the transient ceiling
    fn selectable<'a>(contact_list_id: i64, company_id: i64, max_transient_attempts: u32) -> BoxedItems<'a> {
        let mut query = contact_list_items::table
            .filter(contact_list_items::contact_list_id.eq(contact_list_id))
            .filter(contact_list_items::company_id.eq(company_id))
            .filter(contact_list_items::is_whatsapp_valid.is_null())
            .into_boxed();

        if max_transient_attempts > 0 {
            let ceiling = i32::try_from(max_transient_attempts).unwrap_or(i32::MAX);
            query = query.filter(contact_list_items::validation_attempts.lt(ceiling));
        }

        query
    }
}

#[async_trait]
impl ContactListItemRepository for ContactListItemRepositoryImpl {
    async fn find_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        limit: u32,
        max_transient_attempts: u32,
    ) -> AppResult<Vec<ContactListItem>> {
        let mut conn = self.get_conn()?;

        let rows: Vec<ContactListItemModel> =
            Self::selectable(contact_list_id, company_id, max_transient_attempts)
                .order(contact_list_items::id.asc())
                .limit(i64::from(limit))
                .select(ContactListItemModel::as_select())
                .load(&mut conn)
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to select unresolved rows: {}", e))
                })?;

        Ok(rows.into_iter().map(ContactListItem::from).collect())
    }

    async fn mark_valid(&self, id: i64, canonical_number: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        let updated = diesel::update(
            contact_list_items::table
                .filter(contact_list_items::id.eq(id))
                .filter(contact_list_items::is_whatsapp_valid.is_null()),
        )
        .set((
            contact_list_items::number.eq(canonical_number),
            contact_list_items::is_whatsapp_valid.eq(Some(true)),
            contact_list_items::validated_at.eq(Some(at)),
            contact_list_items::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark row valid: {}", e)))?;

        Ok(updated > 0)
    }

    async fn mark_invalid(&self, id: i64, at: DateTime<Utc>) -> AppResult<bool> {
        let mut conn = self.get_conn()?;

        let updated = diesel::update(
            contact_list_items::table
                .filter(contact_list_items::id.eq(id))
                .filter(contact_list_items::is_whatsapp_valid.is_null()),
        )
        .set((
            contact_list_items::is_whatsapp_valid.eq(Some(false)),
            contact_list_items::validated_at.eq(Some(at)),
            contact_list_items::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to mark row invalid: {}", e)))?;

        Ok(updated > 0)
    }

    async fn record_transient_failure(&self, id: i64) -> AppResult<()> {
        let mut conn = self.get_conn()?;

        diesel::update(
            contact_list_items::table
                .filter(contact_list_items::id.eq(id))
                .filter(contact_list_items::is_whatsapp_valid.is_null()),
        )
        .set(contact_list_items::validation_attempts.eq(contact_list_items::validation_attempts + 1))
        .execute(&mut conn)
        .map_err(|e| AppError::DatabaseError(format!("Failed to record transient failure: {}", e)))?;

        Ok(())
    }

    async fn count_unresolved(
        &self,
        contact_list_id: i64,
        company_id: i64,
        max_transient_attempts: u32,
    ) -> AppResult<i64> {
        let mut conn = self.get_conn()?;

        Self::selectable(contact_list_id, company_id, max_transient_attempts)
            .count()
            .get_result(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to count unresolved rows: {}", e)))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<ContactListItem>> {
        let mut conn = self.get_conn()?;

        let row: Option<ContactListItemModel> = contact_list_items::table
            .find(id)
            .select(ContactListItemModel::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| AppError::DatabaseError(format!("Failed to get contact row: {}", e)))?;

        Ok(row.map(ContactListItem::from))
    }

    async fn insert(&self, items: Vec<NewContactListItem>) -> AppResult<Vec<ContactListItem>> {
        let models: Vec<NewContactListItemModel> = items.into_iter().map(Into::into).collect();
        let mut conn = self.get_conn()?;

        let rows: Vec<ContactListItemModel> = diesel::insert_into(contact_list_items::table)
            .values(&models)
            .returning(ContactListItemModel::as_returning())
            .get_results(&mut conn)
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert contact rows: {}", e)))?;

        Ok(rows.into_iter().map(ContactListItem::from).collect())
    }
}
