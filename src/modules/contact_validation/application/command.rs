use serde::{Deserialize, Serialize};

/// Payload of a validation batch job; the same payload is carried forward on reschedule.
///
/// `batch_size` is left unset by callers that want the configured default; the queue fills
/// it in at enqueue so every stored batch carries an explicit size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationBatchPayload {
    pub contact_list_id: i64,
    pub company_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

impl ValidationBatchPayload {
    pub fn new(contact_list_id: i64, company_id: i64) -> Self {
        Self {
            contact_list_id,
            company_id,
            batch_size: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    /// Explicit size when set, otherwise `default`; never zero
    pub fn batch_size_or(&self, default: u32) -> u32 {
        self.batch_size.unwrap_or(default).max(1)
    }

    /// Queue key shared by every batch of the same list
    pub fn job_key(&self) -> String {
        format!("contact-list:{}", self.contact_list_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_batch_size_falls_back_to_default() {
        let payload: ValidationBatchPayload =
            serde_json::from_value(json!({"contactListId": 7, "companyId": 1})).unwrap();
        assert_eq!(payload.batch_size, None);
        assert_eq!(payload.batch_size_or(25), 25);
        assert_eq!(payload.job_key(), "contact-list:7");
    }

    #[test]
    fn test_explicit_batch_size_wins_over_default() {
        let payload = ValidationBatchPayload::new(1, 1).with_batch_size(10);
        assert_eq!(payload.batch_size_or(50), 10);
        assert_eq!(serde_json::to_value(&payload).unwrap()["batchSize"], json!(10));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(ValidationBatchPayload::new(1, 1).with_batch_size(0).batch_size, Some(1));
        assert_eq!(ValidationBatchPayload::new(1, 1).batch_size_or(0), 1);
    }
}
