//! CLI command implementations
//!
//! Commands read JSON from a file or stdin and write one JSON response per
//! record to stdout. Log lines go to stderr.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde_json::Value;

use crate::observability::{Event, Logger};
use crate::schema::{parse_listing, RecordValidator, SchemaLoader};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_request, read_requests, write_error, write_pretty, write_rejection, write_response};

/// Validator and logger built from one configuration
pub struct Session {
    pub config: Config,
    pub logger: Logger,
    pub validator: RecordValidator,
}

impl Session {
    /// Loads config, populates the schema registry, and compiles the active schema.
    pub fn open(config_path: Option<&Path>) -> CliResult<Self> {
        let config = Config::load_or_default(config_path)?;
        let logger = Logger::new(config.log_level);

        let source = config_path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string());
        logger.trace(Event::ConfigLoaded, &[("source", source.as_str())]);

        let loader = config.schema_loader()?;
        logger.info(
            Event::SchemasLoaded,
            &[("count", loader.schema_count().to_string().as_str())],
        );

        let schema = loader
            .resolve(&config.schema_id, &config.schema_version)?
            .clone();
        let validator = RecordValidator::new(schema, config.validation_options())?;

        Ok(Self {
            config,
            logger,
            validator,
        })
    }

    fn schema_label(&self) -> String {
        let (id, version) = self.validator.schema().key();
        format!("{}@{}", id, version)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_command(cli.command, &mut stdin.lock(), &mut stdout.lock())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, stdin: &mut dyn BufRead, out: &mut dyn Write) -> CliResult<()> {
    match cmd {
        Command::Validate { config, input } => {
            let session = Session::open(config.as_deref())?;
            with_input(input.as_deref(), stdin, |reader| validate(&session, reader, out))
        }
        Command::Batch { config, input } => {
            let session = Session::open(config.as_deref())?;
            with_input(input.as_deref(), stdin, |reader| batch(&session, reader, out))
        }
        Command::Update {
            config,
            existing,
            patch,
        } => {
            let session = Session::open(config.as_deref())?;
            update(&session, &existing, &patch, out)
        }
        Command::Schema { config } => {
            let session = Session::open(config.as_deref())?;
            schema(&session, out)
        }
        Command::ImportListing {
            file,
            schema_version,
            out_dir,
        } => import_listing(&file, &schema_version, out_dir.as_deref(), out),
    }
}

fn with_input<T>(
    path: Option<&Path>,
    stdin: &mut dyn BufRead,
    f: impl FnOnce(&mut dyn BufRead) -> CliResult<T>,
) -> CliResult<T> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                CliError::io_error(format!("Failed to open {}: {}", path.display(), e))
            })?;
            f(&mut BufReader::new(file))
        }
        None => f(stdin),
    }
}

/// Validate a single record.
///
/// Prints the normalized record, or a rejection with field-level errors and
/// returns `REC_CLI_REJECTED`.
pub fn validate(session: &Session, input: &mut dyn BufRead, out: &mut dyn Write) -> CliResult<()> {
    let request = read_request(input)?;
    let schema = session.schema_label();

    match session.validator.validate_json(&request) {
        Ok(record) => {
            session.logger.info(Event::RecordAccepted, &[("schema", schema.as_str())]);
            write_response(out, serde_json::to_value(&record)?)
        }
        Err(errors) => {
            session.logger.warn(
                Event::RecordRejected,
                &[
                    ("schema", schema.as_str()),
                    ("problems", errors.len().to_string().as_str()),
                    ("first", errors.first().code()),
                ],
            );
            write_rejection(out, &errors)?;
            Err(CliError::rejected(errors.len()))
        }
    }
}

/// Outcome counts for one batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub accepted: usize,
    pub rejected: usize,
    /// Lines that were not valid JSON
    pub unreadable: usize,
}

/// Validate JSON lines. Rejections are reported per line and do not stop the batch.
pub fn batch(session: &Session, input: &mut dyn BufRead, out: &mut dyn Write) -> CliResult<()> {
    let summary = run_batch(session, input, out)?;
    session.logger.info(
        Event::BatchComplete,
        &[
            ("accepted", summary.accepted.to_string().as_str()),
            ("rejected", summary.rejected.to_string().as_str()),
            ("unreadable", summary.unreadable.to_string().as_str()),
        ],
    );
    Ok(())
}

pub fn run_batch(session: &Session, input: &mut dyn BufRead, out: &mut dyn Write) -> CliResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, request) in read_requests(input).enumerate() {
        let line = (index + 1).to_string();
        let request = match request {
            Ok(request) => request,
            Err(e) if e.code() == &CliErrorCode::InputError => {
                summary.unreadable += 1;
                write_error(out, e.code_str(), e.message())?;
                continue;
            }
            Err(e) => return Err(e),
        };

        match session.validator.validate_json(&request) {
            Ok(record) => {
                summary.accepted += 1;
                session.logger.trace(Event::RecordAccepted, &[("record", line.as_str())]);
                write_response(out, serde_json::to_value(&record)?)?;
            }
            Err(errors) => {
                summary.rejected += 1;
                session.logger.warn(
                    Event::RecordRejected,
                    &[("record", line.as_str()), ("first", errors.first().code())],
                );
                write_rejection(out, &errors)?;
            }
        }
    }

    Ok(summary)
}

/// Apply a patch file to an existing record file.
pub fn update(session: &Session, existing: &Path, patch: &Path, out: &mut dyn Write) -> CliResult<()> {
    let existing_value = read_json_file(existing)?;
    let patch_value = read_json_file(patch)?;
    let patch = patch_value
        .as_object()
        .ok_or_else(|| CliError::input_error("patch must be a JSON object"))?;

    let current = match session.validator.validate_json(&existing_value) {
        Ok(record) => record,
        Err(errors) => {
            session.logger.warn(
                Event::RecordRejected,
                &[("stage", "existing"), ("first", errors.first().code())],
            );
            write_rejection(out, &errors)?;
            return Err(CliError::rejected(errors.len()));
        }
    };

    match session.validator.validate_update(&current, patch) {
        Ok(record) => {
            let changed = patch.keys().cloned().collect::<Vec<_>>().join(",");
            session.logger.info(Event::RecordUpdated, &[("fields", changed.as_str())]);
            write_response(out, serde_json::to_value(&record)?)
        }
        Err(errors) => {
            session.logger.warn(
                Event::RecordRejected,
                &[("stage", "patch"), ("first", errors.first().code())],
            );
            write_rejection(out, &errors)?;
            Err(CliError::rejected(errors.len()))
        }
    }
}

/// Print the active schema.
pub fn schema(session: &Session, out: &mut dyn Write) -> CliResult<()> {
    write_pretty(out, &serde_json::to_value(session.validator.schema())?)
}

/// Convert an editor listing into schema JSON, optionally saving it.
pub fn import_listing(
    file: &Path,
    version: &str,
    out_dir: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    let content = fs::read_to_string(file)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", file.display(), e)))?;
    let schema = parse_listing(&content, version)?;

    let logger = Logger::default();
    let mut fields = vec![
        ("schema", schema.schema_id.clone()),
        ("fields", schema.fields.len().to_string()),
    ];
    if let Some(dir) = out_dir {
        let saved = SchemaLoader::new(dir).save_schema(&schema)?;
        fields.push(("saved", saved.display().to_string()));
    }
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    logger.info(Event::ListingImported, &fields);

    write_pretty(out, &serde_json::to_value(&schema)?)
}

fn read_json_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}
