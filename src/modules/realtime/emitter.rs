use super::events::ProgressEvent;
use crate::log_debug;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Port for publishing progress to a company's real-time channel
///
/// Emitting is fire-and-forget: implementations must not block and must not fail the caller.
pub trait ProgressEmitter: Send + Sync {
    fn emit(&self, company_id: i64, event: ProgressEvent);
}

/// One broadcast channel per company
///
/// Channels are created on first subscription. Events for a company nobody listens to
/// are discarded.
pub struct TenantEventHub {
    channels: DashMap<i64, broadcast::Sender<ProgressEvent>>,
    capacity: usize,
}

impl TenantEventHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, company_id: i64) -> broadcast::Receiver<ProgressEvent> {
        self.channels
            .entry(company_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn subscriber_count(&self, company_id: i64) -> usize {
        self.channels
            .get(&company_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

impl Default for TenantEventHub {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProgressEmitter for TenantEventHub {
    fn emit(&self, company_id: i64, event: ProgressEvent) {
        let Some(sender) = self.channels.get(&company_id) else {
            return;
        };

        if sender.send(event).is_err() {
            log_debug!("No live subscribers for company {}", company_id);
        }
    }
}
