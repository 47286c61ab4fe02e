//! Schema registry backed by a directory of schema files
//!
//! - `*.json` files hold one serialized `Schema` each
//! - `*.schema` files hold an editor listing, registered as version `LISTING_VERSION`
//! - A registered (id, version) pair can never be replaced

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::listing::parse_listing;
use super::types::Schema;

/// Version assigned to schemas loaded from editor listings
pub const LISTING_VERSION: &str = "1";

/// Schema loader that reads schema files from disk and maintains an in-memory registry.
#[derive(Debug)]
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Loaded schemas indexed by (schema_id, schema_version)
    schemas: BTreeMap<(String, String), Schema>,
}

impl SchemaLoader {
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every schema file in the schema directory.
    ///
    /// Files are read in name order. Returns the number of schemas loaded.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        let dir = self.schema_dir.display().to_string();

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(&dir, format!("Failed to read schema directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed(&dir, format!("Failed to read directory entry: {}", e))
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") | Some("schema") => {
                    self.load_schema_file(&path)?;
                    loaded += 1;
                }
                _ => continue,
            }
        }

        Ok(loaded)
    }

    /// Loads a single schema file and registers it.
    pub fn load_schema_file(&mut self, path: &Path) -> SchemaResult<&Schema> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to read file: {}", e)))?;

        let schema = if path.extension().is_some_and(|ext| ext == "schema") {
            parse_listing(&content, LISTING_VERSION)?
        } else {
            serde_json::from_str::<Schema>(&content)
                .map_err(|e| SchemaError::malformed(&display, format!("Invalid JSON: {}", e)))?
        };

        self.register(schema)
    }

    /// Registers a schema directly.
    pub fn register(&mut self, schema: Schema) -> SchemaResult<&Schema> {
        schema.validate_structure()?;

        let key = (schema.schema_id.clone(), schema.schema_version.clone());
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::Immutable {
                schema_id: key.0,
                version: key.1,
            });
        }

        Ok(self.schemas.entry(key).or_insert(schema))
    }

    /// Gets a schema by ID and version.
    pub fn get(&self, schema_id: &str, schema_version: &str) -> Option<&Schema> {
        self.schemas
            .get(&(schema_id.to_string(), schema_version.to_string()))
    }

    /// Like `get`, but distinguishes an unknown id from an unknown version.
    pub fn resolve(&self, schema_id: &str, schema_version: &str) -> SchemaResult<&Schema> {
        if !self.schema_id_exists(schema_id) {
            return Err(SchemaError::UnknownSchema(schema_id.to_string()));
        }
        self.get(schema_id, schema_version)
            .ok_or_else(|| SchemaError::UnknownVersion {
                schema_id: schema_id.to_string(),
                version: schema_version.to_string(),
            })
    }

    pub fn exists(&self, schema_id: &str, schema_version: &str) -> bool {
        self.get(schema_id, schema_version).is_some()
    }

    /// Checks if any version of a schema ID exists.
    pub fn schema_id_exists(&self, schema_id: &str) -> bool {
        self.schemas.keys().any(|(id, _)| id == schema_id)
    }

    /// Returns all loaded schemas, ordered by (id, version).
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Saves a schema to disk as `schema_<id>_<version>.json`.
    pub fn save_schema(&self, schema: &Schema) -> SchemaResult<PathBuf> {
        let filename = format!(
            "schema_{}_{}.json",
            schema.schema_id, schema.schema_version
        );
        let path = self.schema_dir.join(&filename);
        let display = path.display().to_string();

        if path.exists() {
            return Err(SchemaError::Immutable {
                schema_id: schema.schema_id.clone(),
                version: schema.schema_version.clone(),
            });
        }

        fs::create_dir_all(&self.schema_dir).map_err(|e| {
            SchemaError::malformed(
                self.schema_dir.display().to_string(),
                format!("Failed to create schema directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(schema)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to serialize schema: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| SchemaError::malformed(&display, format!("Failed to write file: {}", e)))?;

        Ok(path)
    }
}
