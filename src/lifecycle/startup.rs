//! Startup checks.
//!
//! # Responsibilities
//! - Validate local JSON assets against their schemas before serving
//! - Warn when running outside production
//!
//! Any failed check is fatal: the server must not start with assets that
//! clients could not parse.

use thiserror::Error;

use crate::config::{AssetCheck, ServerConfig, ValidationConfig};
use crate::remote_config::schema::{read_json, DocumentSchema, SchemaError, SchemaLibrary};
use crate::remote_config::ValidationFailure;

/// Why startup validation failed.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load base schema: {0}")]
    BaseSchema(#[from] SchemaError),

    #[error("{failed} of {total} asset checks failed")]
    AssetsInvalid { failed: usize, total: usize },
}

#[derive(Debug, Error)]
enum CheckError {
    #[error(transparent)]
    Load(#[from] SchemaError),

    #[error(transparent)]
    Invalid(#[from] ValidationFailure),
}

/// Register the base schemas, then run every asset check, logging each
/// result. Returns the number of checks that passed when all of them did.
pub fn validate_assets(validation: &ValidationConfig) -> Result<usize, StartupError> {
    let library = SchemaLibrary::load(&validation.base_schemas)?;
    let checks = &validation.assets;
    tracing::info!(
        count = checks.len(),
        base_schemas = library.len(),
        "Starting asset validation"
    );

    let mut failed = 0;
    for check in checks {
        match run_check(check, &library) {
            Ok(()) => tracing::info!(asset = %check.name, "Asset passed validation"),
            Err(e) => {
                failed += 1;
                tracing::error!(
                    asset = %check.name,
                    document = %check.document.display(),
                    schema = %check.schema.display(),
                    error = %e,
                    "Asset has not passed validation"
                );
            }
        }
    }

    if failed > 0 {
        return Err(StartupError::AssetsInvalid {
            failed,
            total: checks.len(),
        });
    }

    tracing::info!("Asset validation successful");
    Ok(checks.len())
}

fn run_check(check: &AssetCheck, library: &SchemaLibrary) -> Result<(), CheckError> {
    let schema = DocumentSchema::from_path(&check.schema, library)?;
    let document = read_json(&check.document)?;
    schema.check(&document)?;
    Ok(())
}

/// Log warnings about the runtime environment.
pub fn warn_on_environment(config: &ServerConfig) {
    if !config.environment.is_production() {
        tracing::warn!("Running without a production environment; do not expose this instance");
    }
    if config.file_server.enabled {
        tracing::warn!(
            dir = %config.file_server.assets_dir.display(),
            "Static file server enabled; intended for development only"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseSchema;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn checking(assets: Vec<AssetCheck>) -> ValidationConfig {
        ValidationConfig {
            assets,
            ..ValidationConfig::default()
        }
    }

    #[test]
    fn test_all_checks_run_and_failures_counted() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(
            dir.path(),
            "link.schema.json",
            r#"{ "type": "object", "required": ["url"], "properties": { "url": { "type": "string" } } }"#,
        );
        let good = write(dir.path(), "good.json", r#"{ "url": "https://example.com" }"#);
        let bad = write(dir.path(), "bad.json", r#"{ "link": 1 }"#);

        let checks = vec![
            AssetCheck { name: "good".into(), document: good.clone(), schema: schema.clone() },
            AssetCheck { name: "bad".into(), document: bad, schema: schema.clone() },
            AssetCheck { name: "missing".into(), document: dir.path().join("nope.json"), schema },
        ];

        let err = validate_assets(&checking(checks.clone())).unwrap_err();
        assert!(matches!(err, StartupError::AssetsInvalid { failed: 2, total: 3 }));

        assert_eq!(validate_assets(&checking(checks[..1].to_vec())).unwrap(), 1);
    }

    #[test]
    fn test_asset_schemas_ref_base_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let link = write(
            dir.path(),
            "link.schema.json",
            r#"{ "type": "object", "required": ["url"], "properties": { "url": { "type": "string" } } }"#,
        );
        let links = write(
            dir.path(),
            "links.schema.json",
            r#"{ "type": "array", "items": { "$ref": "/link" } }"#,
        );
        let good = write(dir.path(), "links.json", r#"[{ "url": "https://a" }, { "url": "https://b" }]"#);
        let bad = write(dir.path(), "broken.json", r#"[{ "url": "https://a" }, { "href": 2 }]"#);

        let mut validation = checking(vec![
            AssetCheck { name: "links".into(), document: good, schema: links.clone() },
            AssetCheck { name: "broken".into(), document: bad, schema: links },
        ]);

        // Without the base schema the reference cannot resolve
        assert!(matches!(
            validate_assets(&validation),
            Err(StartupError::AssetsInvalid { failed: 2, total: 2 })
        ));

        validation.base_schemas = vec![BaseSchema { id: "/link".into(), path: link }];
        assert!(matches!(
            validate_assets(&validation),
            Err(StartupError::AssetsInvalid { failed: 1, total: 2 })
        ));

        validation.assets.truncate(1);
        assert_eq!(validate_assets(&validation).unwrap(), 1);
    }

    #[test]
    fn test_missing_base_schema_is_fatal() {
        let mut validation = ValidationConfig::default();
        validation.base_schemas = vec![BaseSchema {
            id: "/icon".into(),
            path: PathBuf::from("does/not/exist.json"),
        }];

        assert!(matches!(
            validate_assets(&validation),
            Err(StartupError::BaseSchema(SchemaError::Read { .. }))
        ));
    }

    #[test]
    fn test_no_checks_is_success() {
        assert_eq!(validate_assets(&ValidationConfig::default()).unwrap(), 0);
    }
}
