//! Validation and schema error types
//!
//! Record validation codes:
//! - REC_MISSING_REQUIRED_FIELD
//! - REC_TYPE_MISMATCH
//! - REC_INVALID_OPTION
//! - REC_UNKNOWN_FIELD
//! - REC_NOT_AN_OBJECT
//!
//! Schema errors use the `REC_SCHEMA_` prefix.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::types::FieldType;

/// A single reason a candidate record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field absent, null, or blank
    #[error("field '{field}' is required")]
    MissingRequiredField { field: String },

    /// Value could not be read as the declared type
    #[error("field '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: FieldType },

    /// Value outside the field's option set
    #[error("field '{field}': '{value}' is not one of [{}]", .allowed.join(", "))]
    InvalidOption {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Key not declared in the field table
    #[error("field '{field}' is not declared")]
    UnknownField { field: String },

    /// Candidate root was not a JSON object
    #[error("record must be a JSON object")]
    NotAnObject,
}

impl ValidationError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { .. } => "REC_MISSING_REQUIRED_FIELD",
            ValidationError::TypeMismatch { .. } => "REC_TYPE_MISMATCH",
            ValidationError::InvalidOption { .. } => "REC_INVALID_OPTION",
            ValidationError::UnknownField { .. } => "REC_UNKNOWN_FIELD",
            ValidationError::NotAnObject => "REC_NOT_AN_OBJECT",
        }
    }

    /// Returns the offending field, or `$root` for whole-record errors
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequiredField { field }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::InvalidOption { field, .. }
            | ValidationError::UnknownField { field } => field,
            ValidationError::NotAnObject => "$root",
        }
    }

    /// Field-level report suitable for returning to an API caller
    pub fn report(&self) -> FieldReport {
        FieldReport {
            field: self.field().to_string(),
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Serializable view of one validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

/// Non-empty, ordered set of validation failures for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Wraps a list of failures. Returns `None` for an empty list.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// First failure in table order
    pub fn first(&self) -> &ValidationError {
        &self.errors[0]
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Returns the failure reported for `field`, if any
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    pub fn reports(&self) -> Vec<FieldReport> {
        self.errors.iter().map(ValidationError::report).collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record rejected ({} problem", self.errors.len())?;
        if self.errors.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Errors in a field table, the schema registry, or schema files
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema id and version must be non-empty")]
    MissingIdentity,

    #[error("field names must be non-empty")]
    EmptyFieldName,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field '{field}' has type {field_type}; only text fields may declare options")]
    OptionsOnNonText { field: String, field_type: FieldType },

    #[error("field '{0}' declares an empty option set")]
    EmptyOptions(String),

    #[error("field '{field}' lists option '{option}' more than once")]
    DuplicateOption { field: String, option: String },

    #[error("field '{0}' is required and cannot declare a default")]
    RequiredWithDefault(String),

    #[error("field '{field}' has an invalid default: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("schema '{0}' not found")]
    UnknownSchema(String),

    #[error("schema '{schema_id}' version '{version}' not found")]
    UnknownVersion { schema_id: String, version: String },

    #[error("schema '{schema_id}' version '{version}' is immutable")]
    Immutable { schema_id: String, version: String },

    #[error("malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("schema listing line {line}: {reason}")]
    Listing { line: usize, reason: String },
}

impl SchemaError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MissingIdentity => "REC_SCHEMA_MISSING_IDENTITY",
            SchemaError::EmptyFieldName => "REC_SCHEMA_EMPTY_FIELD_NAME",
            SchemaError::DuplicateField(_) => "REC_SCHEMA_DUPLICATE_FIELD",
            SchemaError::OptionsOnNonText { .. } => "REC_SCHEMA_OPTIONS_ON_NON_TEXT",
            SchemaError::EmptyOptions(_) => "REC_SCHEMA_EMPTY_OPTIONS",
            SchemaError::DuplicateOption { .. } => "REC_SCHEMA_DUPLICATE_OPTION",
            SchemaError::RequiredWithDefault(_) => "REC_SCHEMA_REQUIRED_WITH_DEFAULT",
            SchemaError::InvalidDefault { .. } => "REC_SCHEMA_INVALID_DEFAULT",
            SchemaError::UnknownSchema(_) => "REC_SCHEMA_UNKNOWN",
            SchemaError::UnknownVersion { .. } => "REC_SCHEMA_UNKNOWN_VERSION",
            SchemaError::Immutable { .. } => "REC_SCHEMA_IMMUTABLE",
            SchemaError::Malformed { .. } => "REC_SCHEMA_MALFORMED",
            SchemaError::Listing { .. } => "REC_SCHEMA_LISTING",
        }
    }

    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn listing(line: usize, reason: impl Into<String>) -> Self {
        SchemaError::Listing {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
