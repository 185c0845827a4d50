//! Context shared by shell backends for event emission

use sai_events::{AppEvent, EventEmitter, EventSender};

/// Context for shell operations, carrying the optional event channel
#[derive(Clone, Debug, Default)]
pub struct ShellContext {
    event_sender: Option<EventSender>,
}

impl ShellContext {
    /// Create a new shell context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }

    /// Emit a shell event if an event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for ShellContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
