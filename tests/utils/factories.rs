/// Test data factories using builder pattern
use contact_pipeline::modules::contact_import::application::command::ImportJobPayload;
use contact_pipeline::modules::contact_import::domain::entities::{ImportRecordError, ImportReport};
use contact_pipeline::modules::contact_validation::domain::entities::NewContactListItem;
use serde_json::json;

pub const COMPANY_ID: i64 = 42;
pub const USER_ID: i64 = 7;

/// `count` rows for one list with distinct numbers, in insertion (= id) order
pub fn contact_rows(contact_list_id: i64, count: usize) -> Vec<NewContactListItem> {
    (0..count)
        .map(|i| {
            NewContactListItem::new(
                contact_list_id,
                COMPANY_ID,
                format!("Contact {}", i),
                format!("+55 11 9{:04}-{:04}", i / 10_000, i % 10_000),
            )
        })
        .collect()
}

pub fn import_payload(job_id: &str) -> ImportJobPayload {
    ImportJobPayload::new(COMPANY_ID, USER_ID, "Ana Souza", "file")
        .with_job_id(job_id)
        .with_file("contacts.csv", b"name,number\nAna,5511999999999\n".to_vec())
}

pub struct ReportFactory {
    report: ImportReport,
}

impl ReportFactory {
    pub fn new() -> Self {
        Self {
            report: ImportReport::default(),
        }
    }

    pub fn created(mut self, created: u32) -> Self {
        self.report.created = created;
        self.report.total += created;
        self
    }

    pub fn updated(mut self, updated: u32) -> Self {
        self.report.updated = updated;
        self.report.total += updated;
        self
    }

    pub fn tagged(mut self, tagged: u32) -> Self {
        self.report.tagged = tagged;
        self
    }

    pub fn failed(mut self, failed: u32) -> Self {
        for i in 0..failed {
            self.report.failed.push(ImportRecordError {
                record: json!({ "row": i, "number": "abc" }),
                error: "Invalid number".to_string(),
            });
        }
        self.report.total += failed;
        self
    }

    pub fn build(self) -> ImportReport {
        self.report
    }
}
