//! JSON Schema loading and structural validation.
//!
//! Shared base schemas are registered under their ids before a schema is
//! compiled, so `{"$ref": "/link"}` resolves without touching the network or
//! the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::Resource;
use serde_json::Value;
use thiserror::Error;

use crate::config::BaseSchema;
use crate::remote_config::error::ValidationFailure;

const BUNDLED_SCHEMA: &str = include_str!("../../schemas/config.schema.json");

/// Failures while loading or compiling a schema, or reading a JSON file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to compile schema: {detail}")]
    Compile { detail: String },
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value, SchemaError> {
    let raw = fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Base schemas available to `$ref`, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SchemaLibrary {
    schemas: Vec<(String, Value)>,
}

impl SchemaLibrary {
    /// Read every base schema from disk.
    pub fn load(bases: &[BaseSchema]) -> Result<Self, SchemaError> {
        let mut library = Self::default();
        for base in bases {
            library.insert(base.id.clone(), read_json(&base.path)?);
            tracing::debug!(id = %base.id, path = %base.path.display(), "Registered base schema");
        }
        Ok(library)
    }

    pub fn insert(&mut self, id: impl Into<String>, schema: Value) {
        self.schemas.push((id.into(), schema));
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn resources(&self) -> impl Iterator<Item = (&str, Resource)> + '_ {
        self.schemas
            .iter()
            .map(|(id, schema)| (id.as_str(), Resource::from_contents(schema.clone())))
    }
}

/// A compiled JSON Schema.
pub struct DocumentSchema {
    validator: jsonschema::Validator,
}

impl DocumentSchema {
    /// The schema shipped with the server for configuration documents.
    pub fn bundled() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(BUNDLED_SCHEMA).map_err(|source| SchemaError::Parse {
                path: PathBuf::from("schemas/config.schema.json"),
                source,
            })?;
        Self::from_value(&schema, &SchemaLibrary::default())
    }

    pub fn from_path(path: &Path, library: &SchemaLibrary) -> Result<Self, SchemaError> {
        Self::from_value(&read_json(path)?, library)
    }

    /// Compile `schema` with every schema in `library` resolvable by id.
    pub fn from_value(schema: &Value, library: &SchemaLibrary) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_resources(library.resources())
            .build(schema)
            .map_err(|err| SchemaError::Compile {
                detail: err.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Validate `instance`, collecting every error.
    pub fn check(&self, instance: &Value) -> Result<(), ValidationFailure> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::Schema(errors))
        }
    }
}

impl std::fmt::Debug for DocumentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSchema").finish_non_exhaustive()
    }
}
