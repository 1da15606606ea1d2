use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Queue payload of one contact import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJobPayload {
    pub job_id: String,
    pub company_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub source: String,
    #[serde(default)]
    pub file_name: Option<String>,
    /// Uploaded file, carried base64-encoded in the queue payload
    #[serde(default, with = "blob_base64", skip_serializing_if = "Option::is_none")]
    pub file_blob: Option<Vec<u8>>,
    #[serde(default)]
    pub tag_mapping: Option<serde_json::Value>,
    #[serde(default)]
    pub whatsapp_id: Option<i64>,
    #[serde(default)]
    pub silent_mode: bool,
    #[serde(default)]
    pub dry_run: bool,
}

impl ImportJobPayload {
    /// Payload with a generated job id
    pub fn new(
        company_id: i64,
        user_id: i64,
        user_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            company_id,
            user_id,
            user_name: user_name.into(),
            source: source.into(),
            file_name: None,
            file_blob: None,
            tag_mapping: None,
            whatsapp_id: None,
            silent_mode: false,
            dry_run: false,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_file(mut self, file_name: impl Into<String>, blob: Vec<u8>) -> Self {
        self.file_name = Some(file_name.into());
        self.file_blob = Some(blob);
        self
    }

    pub fn with_tag_mapping(mut self, mapping: serde_json::Value) -> Self {
        self.tag_mapping = Some(mapping);
        self
    }

    pub fn with_whatsapp(mut self, whatsapp_id: i64) -> Self {
        self.whatsapp_id = Some(whatsapp_id);
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent_mode = true;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

mod blob_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blob: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match blob {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| STANDARD.decode(encoded).map_err(de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_job_ids_are_unique() {
        let a = ImportJobPayload::new(1, 1, "Ana", "file");
        let b = ImportJobPayload::new(1, 1, "Ana", "file");
        assert_ne!(a.job_id, b.job_id);
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let payload: ImportJobPayload = serde_json::from_value(serde_json::json!({
            "jobId": "j-1",
            "companyId": 4,
            "userId": 8,
            "userName": "Bruno",
            "source": "resync"
        }))
        .unwrap();

        assert_eq!(payload.job_id, "j-1");
        assert!(payload.file_blob.is_none());
        assert!(!payload.silent_mode);
        assert!(!payload.dry_run);
    }

    #[test]
    fn test_file_blob_is_stored_as_base64() {
        let payload = ImportJobPayload::new(1, 1, "Ana", "file")
            .with_file("contacts.csv", b"name,number\nAna,5511999999999\n".to_vec());

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["fileBlob"],
            serde_json::json!("bmFtZSxudW1iZXIKQW5hLDU1MTE5OTk5OTk5OTkK")
        );

        let decoded: ImportJobPayload = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.file_blob, payload.file_blob);
    }

    #[test]
    fn test_absent_blob_is_omitted_and_invalid_blob_rejected() {
        let payload = ImportJobPayload::new(1, 1, "Ana", "resync");
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("fileBlob").is_none());

        let invalid = serde_json::from_value::<ImportJobPayload>(serde_json::json!({
            "jobId": "j-2",
            "companyId": 4,
            "userId": 8,
            "userName": "Bruno",
            "source": "file",
            "fileBlob": "not base64!"
        }));
        assert!(invalid.is_err());
    }
}
