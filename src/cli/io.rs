//! JSON I/O handling for CLI
//!
//! - Input: one JSON document, or JSON lines for batch mode
//! - Output: one JSON object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::schema::ValidationErrors;

use super::errors::{CliError, CliResult};

/// Code reported for records that fail validation
pub const VALIDATION_FAILED: &str = "REC_VALIDATION_FAILED";

/// Read a single JSON document (may span lines)
pub fn read_request(reader: &mut dyn BufRead) -> CliResult<Value> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    if content.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Read JSON lines, skipping blank lines (for batch mode)
pub fn read_requests(reader: &mut dyn BufRead) -> impl Iterator<Item = CliResult<Value>> + '_ {
    reader
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| {
            let line = line.map_err(CliError::from)?;
            serde_json::from_str(&line).map_err(CliError::from)
        })
}

/// Write a success response
pub fn write_response(out: &mut dyn Write, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    write_line(out, &response)
}

/// Write an error response
pub fn write_error(out: &mut dyn Write, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(out, &response)
}

/// Write a validation failure with field-level detail
pub fn write_rejection(out: &mut dyn Write, errors: &ValidationErrors) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": VALIDATION_FAILED,
        "message": errors.to_string(),
        "errors": errors.reports()
    });
    write_line(out, &response)
}

/// Write a pretty-printed JSON document
pub fn write_pretty(out: &mut dyn Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn write_line(out: &mut dyn Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
