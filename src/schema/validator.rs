//! Record validator
//!
//! Validation semantics:
//! - Required fields must be present and non-blank
//! - Values must read as the declared type
//! - Option fields must hold one of the listed values (case-sensitive)
//! - Omitted fields with a default receive it
//! - Unknown fields are rejected or dropped, per `UnknownFieldPolicy`
//!
//! `null` and blank strings count as absent. At most one error is reported per
//! field, checked in the order presence, type, options.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult, ValidationError, ValidationErrors};
use super::record::{FieldValue, NormalizedRecord, DATE_FORMAT};
use super::types::{FieldDef, FieldType, Schema};

/// What to do with candidate keys the field table does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Report `UnknownField`
    #[default]
    Reject,
    /// Drop the key from the normalized output
    Ignore,
}

/// How many failures to report per record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Report every failing field
    #[default]
    CollectAll,
    /// Stop at the first failure
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    pub unknown_fields: UnknownFieldPolicy,
    pub error_mode: ErrorMode,
}

impl ValidationOptions {
    pub fn fail_fast() -> Self {
        Self {
            error_mode: ErrorMode::FailFast,
            ..Self::default()
        }
    }

    pub fn ignoring_unknown_fields() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Ignore,
            ..Self::default()
        }
    }
}

/// Validator compiled from a field table.
///
/// Holds no mutable state; a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    schema: Schema,
    /// Resolved defaults, parallel to `schema.fields`
    defaults: Vec<Option<FieldValue>>,
    options: ValidationOptions,
}

impl RecordValidator {
    /// Compiles a schema into a validator.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the table is structurally invalid or a default
    /// does not satisfy its own field.
    pub fn new(schema: Schema, options: ValidationOptions) -> SchemaResult<Self> {
        schema.validate_structure()?;

        let defaults = schema
            .fields
            .iter()
            .map(|field| match &field.default {
                None => Ok(None),
                Some(raw) => coerce_value(field, raw).map_err(|e| SchemaError::InvalidDefault {
                    field: field.name.clone(),
                    reason: e.to_string(),
                }),
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self {
            schema,
            defaults,
            options,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Validates a candidate record and returns its normalized form.
    ///
    /// # Errors
    ///
    /// Returns every failure in table order (unknown fields first), or only
    /// the first one under `ErrorMode::FailFast`.
    pub fn validate(&self, candidate: &Map<String, Value>) -> Result<NormalizedRecord, ValidationErrors> {
        let fail_fast = self.options.error_mode == ErrorMode::FailFast;
        let mut errors = Vec::new();

        if self.options.unknown_fields == UnknownFieldPolicy::Reject {
            for key in candidate.keys() {
                if self.schema.field(key).is_none() {
                    errors.push(ValidationError::UnknownField { field: key.clone() });
                    if fail_fast {
                        return Err(ValidationErrors::from(errors.remove(0)));
                    }
                }
            }
        }

        let mut record = NormalizedRecord::new();

        for (field, default) in self.schema.fields.iter().zip(&self.defaults) {
            let outcome = match candidate.get(&field.name) {
                Some(raw) => coerce_value(field, raw),
                None => Ok(None),
            };

            match outcome {
                Ok(Some(value)) => record.insert(field.name.clone(), value),
                Ok(None) if field.required => errors.push(ValidationError::MissingRequiredField {
                    field: field.name.clone(),
                }),
                Ok(None) => {
                    if let Some(value) = default {
                        record.insert(field.name.clone(), value.clone());
                    }
                }
                Err(e) => errors.push(e),
            }

            if fail_fast && !errors.is_empty() {
                break;
            }
        }

        match ValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(record),
        }
    }

    /// Validates an arbitrary JSON value, which must be an object.
    pub fn validate_json(&self, candidate: &Value) -> Result<NormalizedRecord, ValidationErrors> {
        let obj = candidate
            .as_object()
            .ok_or_else(|| ValidationErrors::single(ValidationError::NotAnObject))?;
        self.validate(obj)
    }

    /// Applies a field-level patch to an existing record and re-validates.
    ///
    /// Keys in `patch` replace the existing values; a `null` clears the field,
    /// after which its default (if any) applies again. Patch keys go through
    /// the same unknown-field policy as `validate`. `existing` is untouched.
    pub fn validate_update(
        &self,
        existing: &NormalizedRecord,
        patch: &Map<String, Value>,
    ) -> Result<NormalizedRecord, ValidationErrors> {
        let mut merged = existing.to_candidate();
        // null stays in the merged candidate: it reads as absent for declared
        // fields and is still an unknown key for undeclared ones
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        self.validate(&merged)
    }
}

/// Reads one raw value as `field` declares it.
///
/// Returns `Ok(None)` for values that count as absent. Does not apply the
/// required check or defaults.
pub(crate) fn coerce_value(field: &FieldDef, raw: &Value) -> Result<Option<FieldValue>, ValidationError> {
    if raw.is_null() {
        return Ok(None);
    }
    if let Some(s) = raw.as_str() {
        if s.trim().is_empty() {
            return Ok(None);
        }
    }

    let mismatch = || ValidationError::TypeMismatch {
        field: field.name.clone(),
        expected: field.field_type,
    };

    let value = match field.field_type {
        FieldType::Text => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            if !field.allows(text) {
                return Err(ValidationError::InvalidOption {
                    field: field.name.clone(),
                    value: text.to_string(),
                    allowed: field.options.clone().unwrap_or_default(),
                });
            }
            FieldValue::Text(text.to_string())
        }
        FieldType::Number => FieldValue::Number(parse_number(raw).ok_or_else(mismatch)?),
        FieldType::Date => FieldValue::Date(parse_date(raw).ok_or_else(mismatch)?),
    };

    Ok(Some(value))
}

fn parse_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_date(raw: &Value) -> Option<NaiveDate> {
    let s = raw.as_str()?.trim();
    if !is_iso_date_shape(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// `DDDD-DD-DD`; chrono alone also takes `1990-7-4` and `+1990-07-04`.
fn is_iso_date_shape(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
        Schema::new(
            "account",
            "1",
            vec![
                FieldDef::required_text("owner"),
                FieldDef::optional_text("tier")
                    .with_options(["basic", "gold"])
                    .with_default(json!("basic")),
                FieldDef::optional_number("limit").with_default(json!(0)),
                FieldDef::optional_number("score"),
                FieldDef::optional_date("opened_on"),
            ],
        )
    }

    fn validator() -> RecordValidator {
        RecordValidator::new(sample_schema(), ValidationOptions::default()).unwrap()
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_valid_record_gets_defaults() {
        let record = validator().validate(&obj(json!({ "owner": "ann" }))).unwrap();
        assert_eq!(record.text("owner"), Some("ann"));
        assert_eq!(record.text("tier"), Some("basic"));
        assert_eq!(record.number("limit"), Some(0.0));
        assert!(!record.contains("score"));
        assert!(!record.contains("opened_on"));
    }

    #[test]
    fn test_supplied_value_overrides_default() {
        let record = validator()
            .validate(&obj(json!({ "owner": "ann", "tier": "gold", "limit": 50 })))
            .unwrap();
        assert_eq!(record.text("tier"), Some("gold"));
        assert_eq!(record.number("limit"), Some(50.0));
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validator().validate(&obj(json!({}))).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first(),
            &ValidationError::MissingRequiredField { field: "owner".into() }
        );
    }

    #[test]
    fn test_blank_and_null_count_as_missing() {
        for blank in [json!(""), json!("   "), Value::Null] {
            let errors = validator()
                .validate(&obj(json!({ "owner": blank })))
                .unwrap_err();
            assert_eq!(errors.first().code(), "REC_MISSING_REQUIRED_FIELD");
        }
    }

    #[test]
    fn test_blank_optional_gets_default() {
        let record = validator()
            .validate(&obj(json!({ "owner": "ann", "tier": "", "limit": null })))
            .unwrap();
        assert_eq!(record.text("tier"), Some("basic"));
        assert_eq!(record.number("limit"), Some(0.0));
    }

    #[test]
    fn test_text_rejects_non_strings() {
        let errors = validator().validate(&obj(json!({ "owner": 42 }))).unwrap_err();
        assert_eq!(
            errors.first(),
            &ValidationError::TypeMismatch {
                field: "owner".into(),
                expected: FieldType::Text
            }
        );
    }

    #[test]
    fn test_option_match_is_case_sensitive() {
        let errors = validator()
            .validate(&obj(json!({ "owner": "ann", "tier": "Gold" })))
            .unwrap_err();
        match errors.first() {
            ValidationError::InvalidOption { field, value, allowed } => {
                assert_eq!(field, "tier");
                assert_eq!(value, "Gold");
                assert_eq!(allowed, &vec!["basic".to_string(), "gold".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_numbers_from_json_and_strings() {
        let record = validator()
            .validate(&obj(json!({ "owner": "ann", "limit": " 12.5 ", "score": -3 })))
            .unwrap();
        assert_eq!(record.number("limit"), Some(12.5));
        assert_eq!(record.number("score"), Some(-3.0));
    }

    #[test]
    fn test_non_finite_or_garbage_numbers_rejected() {
        for bad in [json!("abc"), json!("NaN"), json!("inf"), json!(true), json!([1])] {
            let errors = validator()
                .validate(&obj(json!({ "owner": "ann", "score": bad })))
                .unwrap_err();
            assert_eq!(errors.first().code(), "REC_TYPE_MISMATCH");
            assert_eq!(errors.first().field(), "score");
        }
    }

    #[test]
    fn test_dates_must_be_calendar_dates() {
        let record = validator()
            .validate(&obj(json!({ "owner": "ann", "opened_on": "2024-02-29" })))
            .unwrap();
        assert_eq!(record.date("opened_on"), NaiveDate::from_ymd_opt(2024, 2, 29));

        for bad in [json!("2023-02-29"), json!("2024-13-01"), json!("29/02/2024"), json!(20240229)] {
            let errors = validator()
                .validate(&obj(json!({ "owner": "ann", "opened_on": bad })))
                .unwrap_err();
            assert_eq!(
                errors.first(),
                &ValidationError::TypeMismatch {
                    field: "opened_on".into(),
                    expected: FieldType::Date
                }
            );
        }
    }

    #[test]
    fn test_unknown_field_rejected_by_default() {
        let errors = validator()
            .validate(&obj(json!({ "owner": "ann", "nickname": "a" })))
            .unwrap_err();
        assert_eq!(
            errors.first(),
            &ValidationError::UnknownField { field: "nickname".into() }
        );
    }

    #[test]
    fn test_unknown_field_ignored_when_configured() {
        let validator =
            RecordValidator::new(sample_schema(), ValidationOptions::ignoring_unknown_fields()).unwrap();
        let record = validator
            .validate(&obj(json!({ "owner": "ann", "nickname": "a" })))
            .unwrap();
        assert!(!record.contains("nickname"));
    }

    #[test]
    fn test_collects_all_errors_in_order() {
        let errors = validator()
            .validate(&obj(json!({
                "extra": 1,
                "tier": "platinum",
                "score": "x",
                "opened_on": "never"
            })))
            .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["extra", "owner", "tier", "score", "opened_on"]);
    }

    #[test]
    fn test_fail_fast_reports_one_error() {
        let validator = RecordValidator::new(sample_schema(), ValidationOptions::fail_fast()).unwrap();
        let errors = validator
            .validate(&obj(json!({ "tier": "platinum", "score": "x" })))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().field(), "owner");

        let errors = validator
            .validate(&obj(json!({ "owner": "ann", "bogus": 1, "score": "x" })))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().field(), "bogus");
    }

    #[test]
    fn test_validate_json_requires_object() {
        let errors = validator().validate_json(&json!(["owner"])).unwrap_err();
        assert_eq!(errors.first(), &ValidationError::NotAnObject);
    }

    #[test]
    fn test_update_replaces_and_clears() {
        let validator = validator();
        let existing = validator
            .validate(&obj(json!({ "owner": "ann", "tier": "gold", "score": 7 })))
            .unwrap();

        let updated = validator
            .validate_update(&existing, &obj(json!({ "tier": null, "score": 9 })))
            .unwrap();
        assert_eq!(updated.text("tier"), Some("basic"));
        assert_eq!(updated.number("score"), Some(9.0));
        assert_eq!(updated.text("owner"), Some("ann"));

        // existing record is untouched
        assert_eq!(existing.text("tier"), Some("gold"));
    }

    #[test]
    fn test_update_cannot_clear_required_field() {
        let validator = validator();
        let existing = validator.validate(&obj(json!({ "owner": "ann" }))).unwrap();
        let errors = validator
            .validate_update(&existing, &obj(json!({ "owner": null })))
            .unwrap_err();
        assert_eq!(errors.first().code(), "REC_MISSING_REQUIRED_FIELD");
    }

    #[test]
    fn test_update_rejects_undeclared_null_key() {
        let validator = validator();
        let existing = validator.validate(&obj(json!({ "owner": "ann" }))).unwrap();

        let errors = validator
            .validate_update(&existing, &obj(json!({ "nickname": null })))
            .unwrap_err();
        assert_eq!(
            errors.first(),
            &ValidationError::UnknownField {
                field: "nickname".into()
            }
        );

        // same outcome as validating the full candidate
        let mut candidate = existing.to_candidate();
        candidate.insert("nickname".into(), Value::Null);
        assert_eq!(validator.validate(&candidate).unwrap_err(), errors);
    }

    #[test]
    fn test_update_drops_undeclared_null_key_when_ignored() {
        let validator =
            RecordValidator::new(sample_schema(), ValidationOptions::ignoring_unknown_fields()).unwrap();
        let existing = validator.validate(&obj(json!({ "owner": "ann" }))).unwrap();

        let updated = validator
            .validate_update(&existing, &obj(json!({ "nickname": null })))
            .unwrap();
        assert_eq!(updated, existing);
    }

    #[test]
    fn test_date_requires_full_iso_shape() {
        let validator = validator();
        for bad in ["1990-7-4", "+1990-07-04", "1990/07/04", "19900704", "1990-07-04T00:00"] {
            let errors = validator
                .validate(&obj(json!({ "owner": "ann", "opened_on": bad })))
                .unwrap_err();
            assert_eq!(
                errors.first(),
                &ValidationError::TypeMismatch {
                    field: "opened_on".into(),
                    expected: FieldType::Date
                },
                "{} should be rejected",
                bad
            );
        }

        let record = validator
            .validate(&obj(json!({ "owner": "ann", "opened_on": "1990-07-04" })))
            .unwrap();
        assert_eq!(record.date("opened_on").map(|d| d.to_string()).as_deref(), Some("1990-07-04"));
    }

    #[test]
    fn test_revalidating_normalized_record_is_identity() {
        let validator = validator();
        let first = validator
            .validate(&obj(json!({ "owner": "ann", "score": "4.75", "opened_on": "2020-01-31" })))
            .unwrap();
        let second = validator.validate(&first.to_candidate()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_default_rejected_at_compile() {
        let schema = Schema::new(
            "account",
            "1",
            vec![FieldDef::optional_date("opened_on").with_default(json!("yesterday"))],
        );
        let err = RecordValidator::new(schema, ValidationOptions::default()).unwrap_err();
        assert_eq!(err.code(), "REC_SCHEMA_INVALID_DEFAULT");
    }

    #[test]
    fn test_validator_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecordValidator>();

        let validator = validator();
        std::thread::scope(|s| {
            for i in 0..4 {
                let validator = &validator;
                s.spawn(move || {
                    let record = validator
                        .validate(&obj(json!({ "owner": format!("owner-{}", i) })))
                        .unwrap();
                    assert_eq!(record.text("tier"), Some("basic"));
                });
            }
        });
    }
}
