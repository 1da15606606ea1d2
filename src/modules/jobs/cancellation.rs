/// Registry of job ids that were asked to stop
///
/// Shared between the queue facade (cancel requests), running handlers (periodic polls)
/// and handler cleanup. Entries are best-effort and in-memory only.
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    requested: DashSet<String>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a job for cancellation. Idempotent; unknown ids are accepted.
    pub fn request_cancel(&self, job_id: &str) {
        self.requested.insert(job_id.to_string());
    }

    pub fn is_cancelled(&self, job_id: &str) -> bool {
        self.requested.contains(job_id)
    }

    /// Drop the entry once the owning job reached a terminal state
    pub fn clear(&self, job_id: &str) {
        self.requested.remove(job_id);
    }

    pub fn len(&self) -> usize {
        self.requested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }
}

/// Clears a job's registry entry when dropped, whatever path the handler exits through
pub struct CancellationGuard<'a> {
    registry: &'a CancellationRegistry,
    job_id: &'a str,
}

impl<'a> CancellationGuard<'a> {
    pub fn new(registry: &'a CancellationRegistry, job_id: &'a str) -> Self {
        Self { registry, job_id }
    }
}

impl Drop for CancellationGuard<'_> {
    fn drop(&mut self) {
        self.registry.clear(self.job_id);
    }
}
