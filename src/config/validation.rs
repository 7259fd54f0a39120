//! Settings validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals, timeouts, attempts > 0)
//! - Refuse the shipped auth key in production
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::schema::{ServerConfig, SourceConfig, DEFAULT_AUTH_KEY};

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the settings for semantic problems.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&config.file_server.base_url) {
        errors.push(ValidationError::new(
            "file_server.base_url",
            format!("not a valid URL: {}", e),
        ));
    }

    if config.file_server.placeholder.is_empty() {
        errors.push(ValidationError::new(
            "file_server.placeholder",
            "must not be empty",
        ));
    }

    if let SourceConfig::Http { path } = &config.source {
        if !path.starts_with('/') {
            errors.push(ValidationError::new("source.path", "must start with '/'"));
        }
    }

    let refresh = &config.refresh;
    if refresh.interval_secs == 0 {
        errors.push(ValidationError::new("refresh.interval_secs", "must be greater than 0"));
    }
    if refresh.document_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "refresh.document_timeout_secs",
            "must be greater than 0",
        ));
    }
    if refresh.size_timeout_secs == 0 {
        errors.push(ValidationError::new("refresh.size_timeout_secs", "must be greater than 0"));
    }
    if refresh.max_attempts == 0 {
        errors.push(ValidationError::new("refresh.max_attempts", "must be at least 1"));
    }
    if refresh.base_delay_ms > refresh.max_delay_ms {
        errors.push(ValidationError::new(
            "refresh.base_delay_ms",
            "must not exceed refresh.max_delay_ms",
        ));
    }

    let mut ids = HashSet::new();
    for base in &config.validation.base_schemas {
        if base.id.is_empty() {
            errors.push(ValidationError::new("validation.base_schemas", "id must not be empty"));
        } else if !ids.insert(base.id.as_str()) {
            errors.push(ValidationError::new(
                "validation.base_schemas",
                format!("duplicate id {}", base.id),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.auth.key.is_empty() {
        errors.push(ValidationError::new("auth.key", "must not be empty"));
    } else if config.environment.is_production() && config.auth.key == DEFAULT_AUTH_KEY {
        errors.push(ValidationError::new(
            "auth.key",
            "the default key cannot be used in production; set AUTH_KEY",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
