//! Observability for reeldb
//!
//! Structured JSON logging of typed events. Observability is read-only:
//! logging never changes a query result and never fails a query.
//!
//! # Usage
//!
//! ```ignore
//! use reeldb::observability::{log_event, Event};
//!
//! log_event(Event::QueryCount, &[("entity", "film"), ("count", "2")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

use crate::errors;

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Log an event at an explicit severity
pub fn log_event_at(event: Event, severity: Severity, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}

/// Log level for an error of the given severity
pub fn log_severity(severity: errors::Severity) -> Severity {
    match severity {
        errors::Severity::Reject => Severity::Warn,
        errors::Severity::Error => Severity::Error,
        errors::Severity::Fatal => Severity::Fatal,
    }
}
