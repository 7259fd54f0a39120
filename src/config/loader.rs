//! Settings loading from disk and the environment.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load settings from a TOML file, apply environment overrides and validate.
///
/// A missing file is not an error; defaults are used instead.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let mut config = match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Settings file not found, using defaults");
            ServerConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// `AUTH_KEY` and `FILE_SERVER` are only honored in production so a stray
/// shell variable cannot redirect a development instance.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup("SERVER_ENV") {
        match env.trim().to_ascii_lowercase().as_str() {
            "production" => config.environment = Environment::Production,
            "development" => config.environment = Environment::Development,
            other => tracing::warn!(value = %other, "Ignoring unknown SERVER_ENV"),
        }
    }

    if config.environment.is_production() {
        if let Some(key) = lookup("AUTH_KEY").filter(|k| !k.is_empty()) {
            config.auth.key = key;
        }
        if let Some(base) = lookup("FILE_SERVER").filter(|b| !b.is_empty()) {
            config.file_server.base_url = base;
        }
    }

    if lookup("ENABLE_FILE_SERVER").as_deref() == Some("true") {
        config.file_server.enabled = true;
    }
}
