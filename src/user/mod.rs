//! Client portal user records
//!
//! The user field table, typed option sets, and a validator that produces
//! typed `User` values.

mod model;
mod table;

pub use model::{AccountStatus, KycStatus, RiskProfile, Role, TradingExperience, User};
pub use table::{fields, user_schema, UserValidator, USER_SCHEMA_ID, USER_SCHEMA_VERSION};
