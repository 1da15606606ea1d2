//! Crate-wide error type
//!
//! Collaborator boundaries use their own structured enums (`ImportFailure`,
//! `NumberCheckError`); everything that crosses a repository, the queue or configuration
//! is an `AppError`.
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

impl AppError {
    /// Worth another attempt later: the store or the remote side may recover
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::ExternalServiceError(_) | AppError::Timeout(_)
        )
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                AppError::NotFound("Record not found in database".to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        AppError::DatabaseError(format!("Database pool error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("Gateway request timed out: {}", err))
        } else if err.is_connect() {
            AppError::ExternalServiceError(format!("Gateway unreachable: {}", err))
        } else if let Some(status) = err.status() {
            AppError::ExternalServiceError(format!("Gateway returned HTTP {}", status))
        } else {
            AppError::ExternalServiceError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::InvalidInput(format!("Invalid number: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
