//! Observability for the record tools
//!
//! Structured, one-line JSON logs keyed by typed events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Validation itself never logs; callers log outcomes
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use client_records::observability::{Event, Logger, Severity};
//!
//! let logger = Logger::new(Severity::Info);
//! logger.info(Event::SchemasLoaded, &[("count", "1")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
