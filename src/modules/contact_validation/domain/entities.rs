/// Contact list rows and the tri-state WhatsApp validity they carry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `null` / `true` / `false` in storage; monotonic once resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsappValidity {
    Unresolved,
    Valid,
    Invalid,
}

impl WhatsappValidity {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, WhatsappValidity::Unresolved)
    }
}

impl From<Option<bool>> for WhatsappValidity {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => WhatsappValidity::Unresolved,
            Some(true) => WhatsappValidity::Valid,
            Some(false) => WhatsappValidity::Invalid,
        }
    }
}

impl From<WhatsappValidity> for Option<bool> {
    fn from(value: WhatsappValidity) -> Self {
        match value {
            WhatsappValidity::Unresolved => None,
            WhatsappValidity::Valid => Some(true),
            WhatsappValidity::Invalid => Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListItem {
    pub id: i64,
    pub contact_list_id: i64,
    pub company_id: i64,
    pub name: String,
    pub number: String,
    pub email: Option<String>,
    pub is_whatsapp_valid: Option<bool>,
    pub validated_at: Option<DateTime<Utc>>,
    /// Transient check failures seen so far
    pub validation_attempts: i32,
}

impl ContactListItem {
    pub fn validity(&self) -> WhatsappValidity {
        self.is_whatsapp_valid.into()
    }

    /// Whether the row is still eligible for a validation batch
    pub fn is_selectable(&self, max_transient_attempts: u32) -> bool {
        if self.validity().is_resolved() {
            return false;
        }
        max_transient_attempts == 0
            || i64::from(self.validation_attempts) < i64::from(max_transient_attempts)
    }
}

/// Row to insert into a contact list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactListItem {
    pub contact_list_id: i64,
    pub company_id: i64,
    pub name: String,
    pub number: String,
    pub email: Option<String>,
}

impl NewContactListItem {
    pub fn new(contact_list_id: i64, company_id: i64, name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            contact_list_id,
            company_id,
            name: name.into(),
            number: number.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
