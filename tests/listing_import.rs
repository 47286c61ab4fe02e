//! Editor listing tests
//!
//! The user table ships as an editor listing in `schemas/user.schema`; the
//! parsed listing must describe exactly the built-in table.

use client_records::schema::{parse_listing, RecordValidator, SchemaLoader, ValidationOptions};
use client_records::user::{user_schema, USER_SCHEMA_VERSION};
use serde_json::json;
use tempfile::TempDir;

const USER_LISTING: &str = include_str!("../schemas/user.schema");

#[test]
fn test_listing_matches_builtin_table() {
    let parsed = parse_listing(USER_LISTING, USER_SCHEMA_VERSION).unwrap();
    let builtin = user_schema();

    assert_eq!(parsed.key(), builtin.key());
    assert_eq!(parsed.fields, builtin.fields);
}

#[test]
fn test_listing_validator_behaves_like_builtin() {
    let parsed = parse_listing(USER_LISTING, USER_SCHEMA_VERSION).unwrap();
    let from_listing = RecordValidator::new(parsed, ValidationOptions::default()).unwrap();
    let builtin = RecordValidator::new(user_schema(), ValidationOptions::default()).unwrap();

    let candidates = [
        json!({ "role": "user", "email": "a@b.com", "full_name": "Jane Doe" }),
        json!({ "role": "admin", "email": "x@y.z", "full_name": "X", "liquidity": "abc" }),
        json!({ "email": "x@y.z", "risk_profile": "extreme" }),
    ];
    for candidate in &candidates {
        assert_eq!(
            from_listing.validate_json(candidate),
            builtin.validate_json(candidate)
        );
    }
}

#[test]
fn test_loader_reads_listing_directory() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("user.schema"), USER_LISTING).unwrap();

    let mut loader = SchemaLoader::new(temp_dir.path());
    assert_eq!(loader.load_all().unwrap(), 1);
    assert_eq!(
        loader.get("user", USER_SCHEMA_VERSION).map(|s| &s.fields),
        Some(&user_schema().fields)
    );

    // the built-in table cannot be registered over the loaded one
    assert!(loader.register(user_schema()).is_err());
}
