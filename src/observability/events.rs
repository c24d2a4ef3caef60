//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is logged at
//! unless the caller overrides it.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Dataset file read into the row store
    DatasetLoaded,

    // Queries
    /// Criteria bundle compiled to a specification
    CriteriaCompiled,
    /// Unpaged find
    QueryFind,
    /// Paged find
    QueryFindPage,
    /// Count
    QueryCount,
    /// Request rejected before compilation
    QueryRejected,

    // Materialization
    MaterializeStart,
    MaterializeComplete,
    /// Nothing to materialize, no query issued
    MaterializeSkipped,
    /// Re-fetch did not line up with the parents
    MaterializeFault,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::CriteriaCompiled => "CRITERIA_COMPILED",
            Event::QueryFind => "QUERY_FIND",
            Event::QueryFindPage => "QUERY_FIND_PAGE",
            Event::QueryCount => "QUERY_COUNT",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::MaterializeStart => "MATERIALIZE_START",
            Event::MaterializeComplete => "MATERIALIZE_COMPLETE",
            Event::MaterializeSkipped => "MATERIALIZE_SKIPPED",
            Event::MaterializeFault => "MATERIALIZE_FAULT",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::DatasetLoaded => Severity::Info,
            Event::QueryRejected => Severity::Warn,
            Event::MaterializeFault => Severity::Error,
            _ => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::DatasetLoaded,
            Event::CriteriaCompiled,
            Event::QueryFind,
            Event::QueryFindPage,
            Event::QueryCount,
            Event::QueryRejected,
            Event::MaterializeStart,
            Event::MaterializeComplete,
            Event::MaterializeSkipped,
            Event::MaterializeFault,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_query_events_are_trace() {
        assert_eq!(Event::QueryFind.severity(), Severity::Trace);
        assert_eq!(Event::CriteriaCompiled.severity(), Severity::Trace);
        assert_eq!(Event::MaterializeFault.severity(), Severity::Error);
    }
}
