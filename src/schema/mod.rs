//! Schema-driven record validation
//!
//! A field table (`Schema`) is compiled into a `RecordValidator`, which turns
//! raw candidate records into `NormalizedRecord`s or reports why it cannot.
//!
//! # Design Principles
//!
//! - The table is data; one generic routine validates every field
//! - Validation is pure and deterministic
//! - Defaults are applied only to omitted fields
//! - Registered schemas are immutable

mod errors;
mod listing;
mod loader;
mod record;
mod types;
mod validator;

pub use errors::{FieldReport, SchemaError, SchemaResult, ValidationError, ValidationErrors};
pub use listing::parse_listing;
pub use loader::{SchemaLoader, LISTING_VERSION};
pub use record::{FieldValue, NormalizedRecord, DATE_FORMAT};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::{ErrorMode, RecordValidator, UnknownFieldPolicy, ValidationOptions};
