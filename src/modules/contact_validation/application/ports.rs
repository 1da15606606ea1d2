/// Ports used by the validation batch scheduler
use super::command::ValidationBatchPayload;
use crate::modules::contact_validation::domain::errors::NumberCheckError;
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use std::time::Duration;

/// Messaging gateway lookup. Returns the canonical number when it is reachable.
#[async_trait]
pub trait NumberChecker: Send + Sync {
    async fn check_number(&self, number: &str, company_id: i64) -> Result<String, NumberCheckError>;
}

/// Enqueues the next batch of a list. Injected so the scheduler never depends on the queue.
#[async_trait]
pub trait BatchScheduler: Send + Sync {
    async fn schedule_validation_batch(
        &self,
        payload: ValidationBatchPayload,
        delay: Duration,
    ) -> AppResult<()>;
}
