/// Hand-rolled collaborators that record what the pipeline did with them
use async_trait::async_trait;
use contact_pipeline::modules::contact_import::application::ports::{
    AuditEntry, AuditLogger, ContactImporter, ErrorReporter, ImportContext, ImportFailure,
    ImportRequest,
};
use contact_pipeline::modules::contact_import::domain::entities::ImportReport;
use contact_pipeline::modules::contact_validation::application::command::ValidationBatchPayload;
use contact_pipeline::modules::contact_validation::application::ports::{BatchScheduler, NumberChecker};
use contact_pipeline::modules::contact_validation::domain::errors::NumberCheckError;
use contact_pipeline::modules::realtime::{ProgressEmitter, ProgressEvent};
use contact_pipeline::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Importer that walks `records` fake rows, checking the cancellation token between rows
pub struct ScriptedImporter {
    records: u32,
    per_record: Duration,
    failure: Option<String>,
    honours_cancellation: bool,
    calls: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    timeline: Mutex<Vec<(Instant, bool)>>,
}

impl ScriptedImporter {
    pub fn new(records: u32, per_record: Duration) -> Self {
        Self {
            records,
            per_record,
            failure: None,
            honours_cancellation: true,
            calls: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
            timeline: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Keep importing even after the token is cancelled
    pub fn ignoring_cancellation(mut self) -> Self {
        self.honours_cancellation = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// (instant, started?) pairs in the order they happened
    pub fn timeline(&self) -> Vec<(Instant, bool)> {
        self.timeline.lock().unwrap().clone()
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.timeline.lock().unwrap().push((Instant::now(), false));
    }
}

#[async_trait]
impl ContactImporter for ScriptedImporter {
    async fn import_contacts(
        &self,
        _request: ImportRequest,
        context: ImportContext,
    ) -> Result<ImportReport, ImportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now_running, Ordering::SeqCst);
        self.timeline.lock().unwrap().push((Instant::now(), true));

        let mut created = 0;
        for i in 0..self.records {
            if self.honours_cancellation && context.cancellation.is_cancelled() {
                self.leave();
                return Err(ImportFailure::Cancelled);
            }
            tokio::time::sleep(self.per_record).await;
            created += 1;
            context.progress.report((i + 1) as usize, self.records as usize);
        }

        self.leave();
        match &self.failure {
            Some(message) => Err(ImportFailure::Failed(message.clone())),
            None => Ok(ImportReport {
                total: self.records,
                created,
                ..ImportReport::default()
            }),
        }
    }
}

/// Checker answering from a fixed table; unknown numbers resolve to their digits
#[derive(Default)]
pub struct TableChecker {
    answers: HashMap<String, Result<String, NumberCheckError>>,
    checked: Mutex<Vec<String>>,
}

impl TableChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, number: &str, result: Result<&str, NumberCheckError>) -> Self {
        self.answers
            .insert(number.to_string(), result.map(|n| n.to_string()));
        self
    }

    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl NumberChecker for TableChecker {
    async fn check_number(&self, number: &str, _company_id: i64) -> Result<String, NumberCheckError> {
        self.checked.lock().unwrap().push(number.to_string());
        match self.answers.get(number) {
            Some(answer) => answer.clone(),
            None => Ok(number.chars().filter(|c| c.is_ascii_digit()).collect()),
        }
    }
}

/// BatchScheduler that only records what it was asked to schedule
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<(ValidationBatchPayload, Duration)>>,
}

impl RecordingScheduler {
    pub fn scheduled(&self) -> Vec<(ValidationBatchPayload, Duration)> {
        self.scheduled.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchScheduler for RecordingScheduler {
    async fn schedule_validation_batch(
        &self,
        payload: ValidationBatchPayload,
        delay: Duration,
    ) -> AppResult<()> {
        self.scheduled.lock().unwrap().push((payload, delay));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<(i64, ProgressEvent)>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<(i64, ProgressEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressEmitter for RecordingEmitter {
    fn emit(&self, company_id: i64, event: ProgressEvent) {
        self.events.lock().unwrap().push((company_id, event));
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingAudit {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditLogger for RecordingAudit {
    fn record(&self, entry: AuditEntry) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &AppError, context: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((error.to_string(), context.to_string()));
    }
}
