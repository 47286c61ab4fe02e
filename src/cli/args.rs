//! CLI argument definitions using clap
//!
//! Commands:
//! - client-records validate [--config <path>] [--input <path>]
//! - client-records batch [--config <path>] [--input <path>]
//! - client-records update [--config <path>] --existing <path> --patch <path>
//! - client-records schema [--config <path>]
//! - client-records import-listing --file <path> [--schema-version <v>] [--out-dir <dir>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Validate and normalize client portal user records
#[derive(Parser, Debug)]
#[command(name = "client-records")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one JSON record and print its normalized form
    Validate {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Read the record from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Validate JSON lines, printing one response line per record
    Batch {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Read records from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Apply a field-level patch to an existing record
    Update {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Existing record (JSON object)
        #[arg(long)]
        existing: PathBuf,
        /// Fields to change; null clears a field
        #[arg(long)]
        patch: PathBuf,
    },

    /// Print the active schema as JSON
    Schema {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert a schema editor listing to schema JSON
    ImportListing {
        /// Listing file
        #[arg(long)]
        file: PathBuf,
        /// Version to assign to the schema
        #[arg(long, default_value = "1")]
        schema_version: String,
        /// Also save the schema into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
