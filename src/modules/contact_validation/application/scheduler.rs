//! Validation batch scheduler
//!
//! One invocation resolves at most `batch_size` unresolved rows of a contact list, strictly
//! in ascending id order, then either re-enqueues itself after a delay or stops once nothing
//! selectable is left.

use super::command::ValidationBatchPayload;
use super::ports::{BatchScheduler, NumberChecker};
use crate::modules::contact_validation::domain::entities::ContactListItem;
use crate::modules::contact_validation::domain::errors::NumberCheckError;
use crate::modules::contact_validation::domain::repository::ContactListItemRepository;
use crate::modules::realtime::{ProgressEmitter, ProgressEvent, ValidationProgressEvent};
use crate::shared::application::use_case::UseCase;
use crate::shared::config::ValidationConfig;
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_debug, log_error, log_info, log_warn};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// What a single batch did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub selected: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: usize,
    /// Rows still selectable after the batch
    pub remaining: i64,
    pub rescheduled: bool,
    /// Selection or counting failed; the list resumes on the next external trigger
    pub aborted: bool,
}

impl BatchReport {
    pub fn is_done(&self) -> bool {
        !self.aborted && self.remaining == 0
    }
}

enum RowOutcome {
    Valid,
    Invalid,
    Error,
}

pub struct ValidationBatchScheduler {
    items: Arc<dyn ContactListItemRepository>,
    checker: Arc<dyn NumberChecker>,
    scheduler: Arc<dyn BatchScheduler>,
    emitter: Arc<dyn ProgressEmitter>,
    config: ValidationConfig,
}

impl ValidationBatchScheduler {
    pub fn new(
        items: Arc<dyn ContactListItemRepository>,
        checker: Arc<dyn NumberChecker>,
        scheduler: Arc<dyn BatchScheduler>,
        emitter: Arc<dyn ProgressEmitter>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            items,
            checker,
            scheduler,
            emitter,
            config,
        }
    }

    /// Run one batch. Never fails: per-row errors are counted, selection errors abort quietly.
    pub async fn run_batch(&self, payload: ValidationBatchPayload) -> BatchReport {
        let timer = TimedOperation::new("contact_validation_batch");
        let mut report = BatchReport::default();
        let max_attempts = self.config.max_transient_attempts;

        let rows = match self
            .items
            .find_unresolved(
                payload.contact_list_id,
                payload.company_id,
                payload.batch_size_or(self.config.batch_size),
                max_attempts,
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                LogContext::error_with_context(
                    &e,
                    &format!("Selecting rows of contact list {}", payload.contact_list_id),
                );
                report.aborted = true;
                return report;
            }
        };

        if rows.is_empty() {
            log_info!(
                "Validation of contact list {} complete; nothing left to check",
                payload.contact_list_id
            );
            self.emit_progress(&payload, &report);
            timer.finish_with_info(&format!("list {} done", payload.contact_list_id));
            return report;
        }

        report.selected = rows.len();
        for (index, row) in rows.iter().enumerate() {
            match self.validate_row(row, payload.company_id).await {
                RowOutcome::Valid => report.valid += 1,
                RowOutcome::Invalid => report.invalid += 1,
                RowOutcome::Error => report.errors += 1,
            }

            if index + 1 < rows.len() && !self.config.row_delay.is_zero() {
                tokio::time::sleep(self.config.row_delay).await;
            }
        }
        LogContext::batch_progress(
            payload.contact_list_id,
            report.valid + report.invalid,
            report.selected,
        );

        report.remaining = match self
            .items
            .count_unresolved(payload.contact_list_id, payload.company_id, max_attempts)
            .await
        {
            Ok(remaining) => remaining,
            Err(e) => {
                LogContext::error_with_context(
                    &e,
                    &format!("Counting rows of contact list {}", payload.contact_list_id),
                );
                report.aborted = true;
                return report;
            }
        };

        if report.remaining > 0 {
            report.rescheduled = self.reschedule(&payload).await;
        } else {
            log_info!("Contact list {} fully validated", payload.contact_list_id);
        }

        self.emit_progress(&payload, &report);
        timer.finish_with_info(&format!(
            "list {}: {} valid, {} invalid, {} errors, {} remaining",
            payload.contact_list_id, report.valid, report.invalid, report.errors, report.remaining
        ));
        report
    }

    async fn validate_row(&self, row: &ContactListItem, company_id: i64) -> RowOutcome {
        match self.checker.check_number(&row.number, company_id).await {
            Ok(canonical) => match self.items.mark_valid(row.id, &canonical, Utc::now()).await {
                Ok(_) => {
                    log_debug!("Row {} valid as {}", row.id, canonical);
                    RowOutcome::Valid
                }
                Err(e) => {
                    log_warn!("Row {} checked valid but could not be saved: {}", row.id, e);
                    RowOutcome::Error
                }
            },
            Err(NumberCheckError::InvalidNumber { code }) => {
                match self.items.mark_invalid(row.id, Utc::now()).await {
                    Ok(_) => {
                        log_debug!("Row {} invalid ({})", row.id, code);
                        RowOutcome::Invalid
                    }
                    Err(e) => {
                        log_warn!("Row {} checked invalid but could not be saved: {}", row.id, e);
                        RowOutcome::Error
                    }
                }
            }
            Err(err) => {
                log_warn!("Row {} left unresolved: {}", row.id, err);
                if let Err(e) = self.items.record_transient_failure(row.id).await {
                    log_warn!("Could not record transient failure for row {}: {}", row.id, e);
                }
                RowOutcome::Error
            }
        }
    }

    async fn reschedule(&self, payload: &ValidationBatchPayload) -> bool {
        match self
            .scheduler
            .schedule_validation_batch(payload.clone(), self.config.reschedule_delay)
            .await
        {
            Ok(()) => {
                log_debug!(
                    "Next batch of contact list {} scheduled in {:?}",
                    payload.contact_list_id,
                    self.config.reschedule_delay
                );
                true
            }
            Err(e) => {
                log_error!(
                    "Failed to reschedule validation of contact list {}: {}",
                    payload.contact_list_id,
                    e
                );
                false
            }
        }
    }

    fn emit_progress(&self, payload: &ValidationBatchPayload, report: &BatchReport) {
        self.emitter.emit(
            payload.company_id,
            ProgressEvent::ContactListValidation(ValidationProgressEvent {
                contact_list_id: payload.contact_list_id,
                validated: report.valid,
                invalid: report.invalid,
                errors: report.errors,
                remaining: report.remaining,
                done: report.is_done(),
            }),
        );
    }
}

#[async_trait]
impl UseCase<ValidationBatchPayload, BatchReport> for ValidationBatchScheduler {
    async fn execute(&self, command: ValidationBatchPayload) -> AppResult<BatchReport> {
        Ok(self.run_batch(command).await)
    }
}
