/// Diesel models for the contact_list_items table
use crate::modules::contact_validation::domain::entities::{ContactListItem, NewContactListItem};
use crate::schema::contact_list_items;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Insertable, Debug)]
#[diesel(table_name = contact_list_items)]
pub struct NewContactListItemModel {
    pub contact_list_id: i64,
    pub company_id: i64,
    pub name: String,
    pub number: String,
    pub email: Option<String>,
}

impl From<NewContactListItem> for NewContactListItemModel {
    fn from(item: NewContactListItem) -> Self {
        Self {
            contact_list_id: item.contact_list_id,
            company_id: item.company_id,
            name: item.name,
            number: item.number,
            email: item.email,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = contact_list_items)]
pub struct ContactListItemModel {
    pub id: i64,
    pub contact_list_id: i64,
    pub company_id: i64,
    pub name: String,
    pub number: String,
    pub email: Option<String>,
    pub is_whatsapp_valid: Option<bool>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validation_attempts: i32,
}

impl From<ContactListItemModel> for ContactListItem {
    fn from(model: ContactListItemModel) -> Self {
        Self {
            id: model.id,
            contact_list_id: model.contact_list_id,
            company_id: model.company_id,
            name: model.name,
            number: model.number,
            email: model.email,
            is_whatsapp_valid: model.is_whatsapp_valid,
            validated_at: model.validated_at,
            validation_attempts: model.validation_attempts,
        }
    }
}
