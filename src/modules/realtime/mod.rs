/// Real-time progress notification
///
/// Import and validation handlers publish here; transports (websocket gateways and the
/// like) subscribe per company.
pub mod emitter;
pub mod events;

pub use emitter::{ProgressEmitter, TenantEventHub};
pub use events::{ImportStatusEvent, ProgressEvent, ValidationProgressEvent};
