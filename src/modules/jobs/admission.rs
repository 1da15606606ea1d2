//! Admission control for import jobs
//!
//! Two gates are combined: a semaphore bounds how many imports execute at once, and a
//! governor quota bounds how many may start within the configured window. Jobs that do
//! not get through simply wait; nothing is ever dropped.

use crate::shared::config::ImportConfig;
use crate::shared::errors::{AppError, AppResult};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Slot held by a running import; dropping it frees capacity for the next job
#[derive(Debug)]
pub struct AdmissionPermit {
    _slot: OwnedSemaphorePermit,
}

pub struct AdmissionLimiter {
    slots: Arc<Semaphore>,
    starts: Option<DefaultDirectRateLimiter>,
    max_concurrent: u32,
    window: Duration,
}

impl AdmissionLimiter {
    pub fn new(max_concurrent: u32, window: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);

        Self {
            slots: Arc::new(Semaphore::new(max_concurrent as usize)),
            starts: Self::create_start_limiter(max_concurrent, window),
            max_concurrent,
            window,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.max_concurrent, config.admission_window)
    }

    /// At most `max_concurrent` starts per `window`, replenished evenly across the window
    fn create_start_limiter(max_concurrent: u32, window: Duration) -> Option<DefaultDirectRateLimiter> {
        let burst = NonZeroU32::new(max_concurrent)?;
        let period = window / max_concurrent;
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(GovernorRateLimiter::direct(quota))
    }

    /// Wait until a slot is free and the start window has room
    pub async fn admit(&self) -> AppResult<AdmissionPermit> {
        let permit = self.reserve_slot().await?;
        self.wait_for_start().await;
        Ok(permit)
    }

    /// First half of `admit`: wait for a free execution slot only.
    /// Lets the caller claim work before spending a start from the window.
    pub async fn reserve_slot(&self) -> AppResult<AdmissionPermit> {
        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::InternalError("Admission limiter closed".to_string()))?;

        Ok(AdmissionPermit { _slot: slot })
    }

    /// Second half of `admit`: wait until the start window has room
    pub async fn wait_for_start(&self) {
        if let Some(starts) = &self.starts {
            starts.until_ready().await;
        }
    }

    /// Non-blocking variant; None when either gate is saturated
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        let slot = self.slots.clone().try_acquire_owned().ok()?;

        if let Some(starts) = &self.starts {
            starts.check().ok()?;
        }

        Some(AdmissionPermit { _slot: slot })
    }

    /// Number of free execution slots
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
