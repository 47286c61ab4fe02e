//! CLI module
//!
//! Provides command-line interface for:
//! - validate: one record in, normalized record or field errors out
//! - batch: JSON lines in, one response per line out
//! - update: field-level patch against an existing record
//! - schema: print the active field table
//! - import-listing: convert an editor listing to schema JSON

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{batch, import_listing, run, run_batch, run_command, schema, update, validate, BatchSummary, Session};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_requests, write_error, write_rejection, write_response, VALIDATION_FAILED};
