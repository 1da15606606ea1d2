use crate::modules::contact_import::domain::entities::ImportJobStatus;
use crate::modules::realtime::{ImportStatusEvent, ProgressEmitter, ProgressEvent};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Forwards importer progress as `processing` events
///
/// Only emits when the percentage advanced by at least one point, so a large file
/// produces at most ~100 events.
#[derive(Clone)]
pub struct ImportProgressReporter {
    emitter: Arc<dyn ProgressEmitter>,
    company_id: i64,
    job_id: Arc<str>,
    last_emitted_percentage: Arc<AtomicU8>,
}

impl ImportProgressReporter {
    pub fn new(emitter: Arc<dyn ProgressEmitter>, company_id: i64, job_id: &str) -> Self {
        Self {
            emitter,
            company_id,
            job_id: Arc::from(job_id),
            last_emitted_percentage: Arc::new(AtomicU8::new(0)),
        }
    }

    /// 100% is reserved for the completion event
    pub fn percentage(processed: usize, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let pct = (processed.min(total) * 100) / total;
        pct.min(99) as u8
    }

    /// Returns whether an event was emitted
    pub fn report(&self, processed: usize, total: usize) -> bool {
        let current = Self::percentage(processed, total);
        let previous = self.last_emitted_percentage.fetch_max(current, Ordering::SeqCst);

        if current <= previous {
            return false;
        }

        self.emitter.emit(
            self.company_id,
            ProgressEvent::ImportStatus(ImportStatusEvent {
                job_id: self.job_id.to_string(),
                status: ImportJobStatus::Processing,
                progress: current,
                result: None,
                error: None,
            }),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressEmitter for Recorder {
        fn emit(&self, _company_id: i64, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(ImportProgressReporter::percentage(0, 0), 0);
        assert_eq!(ImportProgressReporter::percentage(50, 200), 25);
        assert_eq!(ImportProgressReporter::percentage(200, 200), 99);
        assert_eq!(ImportProgressReporter::percentage(300, 200), 99);
    }

    #[test]
    fn test_reports_only_on_percentage_change() {
        let recorder = Arc::new(Recorder::default());
        let reporter = ImportProgressReporter::new(recorder.clone(), 1, "job-1");

        let emitted: usize = (1..=1000)
            .map(|processed| reporter.report(processed, 1000) as usize)
            .sum();

        assert_eq!(emitted, 99);
        assert_eq!(recorder.0.lock().unwrap().len(), 99);
    }

    #[test]
    fn test_never_goes_backwards() {
        let recorder = Arc::new(Recorder::default());
        let reporter = ImportProgressReporter::new(recorder.clone(), 1, "job-1");

        assert!(reporter.report(50, 100));
        assert!(!reporter.report(10, 100));
        assert!(reporter.report(60, 100));
    }
}
