//! Observable events
//!
//! Every log line names one of these events. Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Setup
    /// Configuration file read and checked
    ConfigLoaded,
    /// Schema registry populated
    SchemasLoaded,

    // Records
    /// Candidate passed validation
    RecordAccepted,
    /// Candidate failed validation
    RecordRejected,
    /// Patch applied to an existing record
    RecordUpdated,
    /// Batch input exhausted
    BatchComplete,

    // Tooling
    /// Editor listing converted to schema JSON
    ListingImported,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::RecordAccepted => "RECORD_ACCEPTED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::BatchComplete => "BATCH_COMPLETE",
            Event::ListingImported => "LISTING_IMPORTED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
