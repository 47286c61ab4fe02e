//! Typed view of a validated user record

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldValue, NormalizedRecord, ValidationError, ValidationErrors};

use super::table::fields;

macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in option-list order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Exact, case-sensitive match against the option names
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn options() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_set! {
    /// Role of the user in the app
    Role { Admin => "admin", User => "user" }
}

option_set! {
    RiskProfile {
        Conservative => "conservative",
        Moderate => "moderate",
        Aggressive => "aggressive",
    }
}

option_set! {
    TradingExperience {
        Novice => "novice",
        Average => "average",
        Advanced => "advanced",
    }
}

option_set! {
    /// Account lifecycle state; new accounts start as `Pending`
    AccountStatus {
        Pending => "pending",
        Approved => "approved",
        Active => "active",
        Suspended => "suspended",
    }
}

option_set! {
    /// Identity verification state; new accounts start as `Pending`
    KycStatus {
        Pending => "pending",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// A client portal user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub role: Role,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Available investment capital
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<RiskProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trading_experience: Option<TradingExperience>,
    pub account_status: AccountStatus,
    pub account_balance: f64,
    pub total_profit_loss: f64,
    pub kyc_status: KycStatus,
}

impl User {
    /// Builds the typed view of a record validated against the user table.
    pub fn from_record(record: &NormalizedRecord) -> Result<Self, ValidationErrors> {
        Ok(Self {
            role: required(record, fields::ROLE, Role::parse, Role::options)?,
            email: required_text(record, fields::EMAIL)?,
            full_name: required_text(record, fields::FULL_NAME)?,
            phone: record.text(fields::PHONE).map(String::from),
            address: record.text(fields::ADDRESS).map(String::from),
            date_of_birth: record.date(fields::DATE_OF_BIRTH),
            liquidity: record.number(fields::LIQUIDITY),
            risk_profile: optional(record, fields::RISK_PROFILE, RiskProfile::parse, RiskProfile::options)?,
            trading_experience: optional(
                record,
                fields::TRADING_EXPERIENCE,
                TradingExperience::parse,
                TradingExperience::options,
            )?,
            account_status: required(
                record,
                fields::ACCOUNT_STATUS,
                AccountStatus::parse,
                AccountStatus::options,
            )?,
            account_balance: required_number(record, fields::ACCOUNT_BALANCE)?,
            total_profit_loss: required_number(record, fields::TOTAL_PROFIT_LOSS)?,
            kyc_status: required(record, fields::KYC_STATUS, KycStatus::parse, KycStatus::options)?,
        })
    }

    /// Normalized record holding exactly this user's values.
    pub fn to_record(&self) -> NormalizedRecord {
        let mut record = NormalizedRecord::new();
        let text = |s: &str| FieldValue::Text(s.to_string());

        record.insert(fields::ROLE, text(self.role.as_str()));
        record.insert(fields::EMAIL, text(&self.email));
        record.insert(fields::FULL_NAME, text(&self.full_name));
        if let Some(phone) = &self.phone {
            record.insert(fields::PHONE, text(phone));
        }
        if let Some(address) = &self.address {
            record.insert(fields::ADDRESS, text(address));
        }
        if let Some(dob) = self.date_of_birth {
            record.insert(fields::DATE_OF_BIRTH, FieldValue::Date(dob));
        }
        if let Some(liquidity) = self.liquidity {
            record.insert(fields::LIQUIDITY, FieldValue::Number(liquidity));
        }
        if let Some(risk) = self.risk_profile {
            record.insert(fields::RISK_PROFILE, text(risk.as_str()));
        }
        if let Some(experience) = self.trading_experience {
            record.insert(fields::TRADING_EXPERIENCE, text(experience.as_str()));
        }
        record.insert(fields::ACCOUNT_STATUS, text(self.account_status.as_str()));
        record.insert(fields::ACCOUNT_BALANCE, FieldValue::Number(self.account_balance));
        record.insert(fields::TOTAL_PROFIT_LOSS, FieldValue::Number(self.total_profit_loss));
        record.insert(fields::KYC_STATUS, text(self.kyc_status.as_str()));
        record
    }
}

fn required_text(record: &NormalizedRecord, field: &str) -> Result<String, ValidationError> {
    record
        .text(field)
        .map(String::from)
        .ok_or_else(|| ValidationError::MissingRequiredField {
            field: field.to_string(),
        })
}

fn required_number(record: &NormalizedRecord, field: &str) -> Result<f64, ValidationError> {
    record
        .number(field)
        .ok_or_else(|| ValidationError::MissingRequiredField {
            field: field.to_string(),
        })
}

fn optional<T>(
    record: &NormalizedRecord,
    field: &str,
    parse: fn(&str) -> Option<T>,
    options: fn() -> Vec<&'static str>,
) -> Result<Option<T>, ValidationError> {
    match record.text(field) {
        None => Ok(None),
        Some(value) => parse(value)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidOption {
                field: field.to_string(),
                value: value.to_string(),
                allowed: options().into_iter().map(String::from).collect(),
            }),
    }
}

fn required<T>(
    record: &NormalizedRecord,
    field: &str,
    parse: fn(&str) -> Option<T>,
    options: fn() -> Vec<&'static str>,
) -> Result<T, ValidationError> {
    optional(record, field, parse, options)?.ok_or_else(|| ValidationError::MissingRequiredField {
        field: field.to_string(),
    })
}
