//! Field table definitions
//!
//! Supported field types:
//! - text: UTF-8 string, stored verbatim
//! - number: finite 64-bit float
//! - date: calendar date (`YYYY-MM-DD`)

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::validator::coerce_value;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Any UTF-8 string
    Text,
    /// Finite number
    Number,
    /// Calendar date
    Date,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
        }
    }

    /// Parses a type name as written in schema files and editor listings
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "date" => Some(FieldType::Date),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One row of a field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it appears in candidate records
    pub name: String,
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be present and non-blank
    #[serde(default)]
    pub required: bool,
    /// Raw default substituted when the field is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Closed set of legal values (text fields only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDef {
    fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
            default: None,
            options: None,
            description: None,
        }
    }

    /// Create a required text field
    pub fn required_text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text, true)
    }

    /// Create an optional text field
    pub fn optional_text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text, false)
    }

    /// Create an optional number field
    pub fn optional_number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number, false)
    }

    /// Create an optional date field
    pub fn optional_date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date, false)
    }

    /// Restricts the field to a closed option set
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the value substituted when the field is omitted
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if `value` is one of the declared options.
    ///
    /// Fields without an option set accept every value.
    pub fn allows(&self, value: &str) -> bool {
        match &self.options {
            Some(options) => options.iter().any(|o| o == value),
            None => true,
        }
    }
}

/// Complete field table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema identifier (e.g. "user")
    pub schema_id: String,
    /// Schema version
    pub schema_version: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions in table order
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            description: None,
            fields,
        }
    }

    /// Returns the unique key for this schema (id, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.schema_id, &self.schema_version)
    }

    /// Looks up a field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of all required fields, in table order
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    /// Validates the table itself (not a record).
    pub fn validate_structure(&self) -> SchemaResult<()> {
        if self.schema_id.trim().is_empty() || self.schema_version.trim().is_empty() {
            return Err(SchemaError::MissingIdentity);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }

            if let Some(options) = &field.options {
                if field.field_type != FieldType::Text {
                    return Err(SchemaError::OptionsOnNonText {
                        field: field.name.clone(),
                        field_type: field.field_type,
                    });
                }
                if options.is_empty() {
                    return Err(SchemaError::EmptyOptions(field.name.clone()));
                }
                let mut distinct = HashSet::new();
                if let Some(dup) = options.iter().find(|o| !distinct.insert(o.as_str())) {
                    return Err(SchemaError::DuplicateOption {
                        field: field.name.clone(),
                        option: dup.clone(),
                    });
                }
            }

            if let Some(default) = &field.default {
                if field.required {
                    return Err(SchemaError::RequiredWithDefault(field.name.clone()));
                }
                match coerce_value(field, default) {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        return Err(SchemaError::InvalidDefault {
                            field: field.name.clone(),
                            reason: "default is blank".into(),
                        })
                    }
                    Err(e) => {
                        return Err(SchemaError::InvalidDefault {
                            field: field.name.clone(),
                            reason: e.to_string(),
                        })
                    }
                }
            }
        }

        Ok(())
    }
}
