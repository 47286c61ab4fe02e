//! Configuration file
//!
//! Every key is optional; running without `--config` uses the defaults:
//!
//! ```json
//! { "schema_dir": null, "schema_id": "user", "schema_version": "1",
//!   "unknown_fields": "reject", "fail_fast": false, "log_level": "info" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;
use crate::schema::{ErrorMode, SchemaError, SchemaLoader, UnknownFieldPolicy, ValidationOptions};
use crate::user::{user_schema, USER_SCHEMA_ID, USER_SCHEMA_VERSION};

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of extra schema files (`*.json`, `*.schema`).
    /// Relative paths resolve against the config file's directory.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    /// Schema to validate against (default: built-in "user")
    #[serde(default = "default_schema_id")]
    pub schema_id: String,

    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,

    /// Report only the first failure per record
    #[serde(default)]
    pub fail_fast: bool,

    /// Minimum severity written to the log
    #[serde(default)]
    pub log_level: Severity,
}

fn default_schema_id() -> String {
    USER_SCHEMA_ID.to_string()
}

fn default_schema_version() -> String {
    USER_SCHEMA_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: None,
            schema_id: default_schema_id(),
            schema_version: default_schema_version(),
            unknown_fields: UnknownFieldPolicy::default(),
            fail_fast: false,
            log_level: Severity::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        if let Some(dir) = &config.schema_dir {
            if dir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                config.schema_dir = Some(base.join(dir));
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` if given, else use defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.schema_id.trim().is_empty() {
            return Err(CliError::config_error("schema_id must be non-empty"));
        }
        if self.schema_version.trim().is_empty() {
            return Err(CliError::config_error("schema_version must be non-empty"));
        }
        Ok(())
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            unknown_fields: self.unknown_fields,
            error_mode: if self.fail_fast {
                ErrorMode::FailFast
            } else {
                ErrorMode::CollectAll
            },
        }
    }

    /// Registry holding the built-in user schema plus everything in `schema_dir`.
    ///
    /// `schema_dir` may carry its own copy of the user table (for instance the
    /// shipped `user.schema` listing) as long as it declares the same fields.
    pub fn schema_loader(&self) -> CliResult<SchemaLoader> {
        let dir = self
            .schema_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut loader = SchemaLoader::new(&dir);

        if self.schema_dir.is_some() {
            loader.load_all()?;
        }

        let builtin = user_schema();
        let supplied = loader
            .get(USER_SCHEMA_ID, USER_SCHEMA_VERSION)
            .map(|loaded| loaded.fields == builtin.fields);
        match supplied {
            Some(true) => {}
            Some(false) => {
                return Err(SchemaError::Immutable {
                    schema_id: USER_SCHEMA_ID.to_string(),
                    version: USER_SCHEMA_VERSION.to_string(),
                }
                .into())
            }
            None => {
                loader.register(builtin)?;
            }
        }

        Ok(loader)
    }
}
