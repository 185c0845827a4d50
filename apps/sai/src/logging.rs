//! Structured logging integration for events
//!
//! Every event handled by the CLI is also written to the tracing
//! subscriber, at the level the event maps to, with its JSON form attached.

use sai_events::AppEvent;
use tracing::{debug, error, info, trace, warn, Level};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let target = event.log_target();
    let fields = event.log_fields();

    let level = event.log_level();
    if level == Level::ERROR {
        error!(target: "sai::events", domain = target, event = %fields);
    } else if level == Level::WARN {
        warn!(target: "sai::events", domain = target, event = %fields);
    } else if level == Level::INFO {
        info!(target: "sai::events", domain = target, event = %fields);
    } else if level == Level::DEBUG {
        debug!(target: "sai::events", domain = target, event = %fields);
    } else {
        trace!(target: "sai::events", domain = target, event = %fields);
    }
}
