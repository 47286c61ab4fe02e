//! client-records - schema-driven validation of client portal user records
//!
//! A declarative field table is compiled into a pure validator that turns raw
//! field/value maps into normalized records with defaults applied, or reports
//! every missing field, type mismatch, and invalid option.

pub mod cli;
pub mod observability;
pub mod schema;
pub mod user;
