//! Command-handler seam shared by both pipelines
//!
//! The import handler and the validation batch scheduler both implement `UseCase`, so
//! callers that only need "run this payload" (tests, an embedding host) do not depend on
//! either concrete type.
//!
//! ```rust,ignore
//! let handler: Arc<dyn UseCase<ImportJobPayload, ImportJob> + Send + Sync> = pipeline_handler;
//! let job = handler.execute(payload).await?;
//! assert!(job.status.is_terminal());
//! ```
use crate::shared::errors::AppResult;
use async_trait::async_trait;

#[async_trait]
pub trait UseCase<TCommand, TResult> {
    async fn execute(&self, command: TCommand) -> AppResult<TResult>;
}
