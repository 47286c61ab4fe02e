//! The user field table

use serde_json::{json, Map, Value};

use crate::schema::{
    FieldDef, NormalizedRecord, RecordValidator, Schema, SchemaResult, ValidationErrors,
    ValidationOptions,
};

use super::model::{AccountStatus, KycStatus, RiskProfile, Role, TradingExperience, User};

pub const USER_SCHEMA_ID: &str = "user";
pub const USER_SCHEMA_VERSION: &str = "1";

/// Field names of the user record
pub mod fields {
    pub const ROLE: &str = "role";
    pub const EMAIL: &str = "email";
    pub const FULL_NAME: &str = "full_name";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const LIQUIDITY: &str = "liquidity";
    pub const RISK_PROFILE: &str = "risk_profile";
    pub const TRADING_EXPERIENCE: &str = "trading_experience";
    pub const ACCOUNT_STATUS: &str = "account_status";
    pub const ACCOUNT_BALANCE: &str = "account_balance";
    pub const TOTAL_PROFIT_LOSS: &str = "total_profit_loss";
    pub const KYC_STATUS: &str = "kyc_status";
}

/// Built-in user table.
pub fn user_schema() -> Schema {
    let mut schema = Schema::new(
        USER_SCHEMA_ID,
        USER_SCHEMA_VERSION,
        vec![
            FieldDef::required_text(fields::ROLE)
                .with_description("The role of the user in the app")
                .with_options(Role::options()),
            FieldDef::required_text(fields::EMAIL).with_description("The email of the user"),
            FieldDef::required_text(fields::FULL_NAME).with_description("The full name of the user"),
            FieldDef::optional_text(fields::PHONE).with_description("Client phone number"),
            FieldDef::optional_text(fields::ADDRESS).with_description("Client address"),
            FieldDef::optional_date(fields::DATE_OF_BIRTH),
            FieldDef::optional_number(fields::LIQUIDITY).with_description("Available investment capital"),
            FieldDef::optional_text(fields::RISK_PROFILE).with_options(RiskProfile::options()),
            FieldDef::optional_text(fields::TRADING_EXPERIENCE).with_options(TradingExperience::options()),
            FieldDef::optional_text(fields::ACCOUNT_STATUS)
                .with_default(json!(AccountStatus::Pending.as_str()))
                .with_options(AccountStatus::options()),
            FieldDef::optional_number(fields::ACCOUNT_BALANCE).with_default(json!(0)),
            FieldDef::optional_number(fields::TOTAL_PROFIT_LOSS).with_default(json!(0)),
            FieldDef::optional_text(fields::KYC_STATUS)
                .with_default(json!(KycStatus::Pending.as_str()))
                .with_options(KycStatus::options()),
        ],
    );
    schema.description = Some("Client portal user".into());
    schema
}

/// Validator over the user table that yields typed `User`s.
#[derive(Debug, Clone)]
pub struct UserValidator {
    inner: RecordValidator,
}

impl UserValidator {
    pub fn new(options: ValidationOptions) -> SchemaResult<Self> {
        Ok(Self {
            inner: RecordValidator::new(user_schema(), options)?,
        })
    }

    /// Underlying generic validator
    pub fn records(&self) -> &RecordValidator {
        &self.inner
    }

    /// Validates a new user. Omitted status and balance fields get their defaults.
    pub fn validate(&self, candidate: &Map<String, Value>) -> Result<User, ValidationErrors> {
        let record = self.inner.validate(candidate)?;
        User::from_record(&record)
    }

    pub fn validate_json(&self, candidate: &Value) -> Result<User, ValidationErrors> {
        let record = self.inner.validate_json(candidate)?;
        User::from_record(&record)
    }

    /// Applies a field-level change (e.g. `{"kyc_status": "submitted"}`) to an existing user.
    pub fn update(&self, existing: &User, patch: &Map<String, Value>) -> Result<User, ValidationErrors> {
        let record: NormalizedRecord = self.inner.validate_update(&existing.to_record(), patch)?;
        User::from_record(&record)
    }
}
