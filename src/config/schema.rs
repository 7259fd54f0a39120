//! Server settings definitions.
//!
//! These are the settings of the server process itself, read from a TOML
//! file at startup. The remote configuration document served to clients
//! lives in [`crate::remote_config`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Auth key shipped with the defaults. Refused in production.
pub const DEFAULT_AUTH_KEY: &str = "development-auth-key";

/// Root settings for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Deployment environment.
    pub environment: Environment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Authorization gate settings.
    pub auth: AuthConfig,

    /// File server location and the optional development asset server.
    pub file_server: FileServerConfig,

    /// Where the remote configuration document is read from.
    pub source: SourceConfig,

    /// Refresh cadence and outbound request limits.
    pub refresh: RefreshConfig,

    /// Startup schema validation.
    pub validation: ValidationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Authorization gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value the `Authorization` header must carry.
    pub key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_AUTH_KEY.to_string(),
        }
    }
}

/// File server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the asset host, substituted into document placeholders.
    pub base_url: String,

    /// Token replaced by `base_url` in every string of the document.
    pub placeholder: String,

    /// Serve `assets_dir` under `/assets` (development only).
    pub enabled: bool,

    /// Directory served when `enabled` is set.
    pub assets_dir: PathBuf,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            placeholder: "{file_server}".to_string(),
            enabled: false,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// Where the configuration document comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Fetch `{file_server.base_url}{path}` over HTTP.
    Http {
        #[serde(default = "default_document_path")]
        path: String,
    },
    /// Read a local file, skipping refreshes while its mtime is unchanged.
    File { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Http {
            path: default_document_path(),
        }
    }
}

fn default_document_path() -> String {
    "/assets/config.json".to_string()
}

/// Refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between scheduled refreshes.
    pub interval_secs: u64,

    /// Timeout for fetching the document, per attempt.
    pub document_timeout_secs: u64,

    /// Timeout for each HEAD request used to read asset sizes.
    pub size_timeout_secs: u64,

    /// Attempts made to fetch the document before the refresh fails.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            document_timeout_secs: 10,
            size_timeout_secs: 5,
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

/// Schema validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Schema for the remote document. The bundled schema is used when unset.
    pub document_schema: Option<PathBuf>,

    /// Shared schemas registered before any other schema is compiled.
    pub base_schemas: Vec<BaseSchema>,

    /// Local files validated once at startup.
    pub assets: Vec<AssetCheck>,
}

/// A schema other schemas can `$ref` by id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BaseSchema {
    /// Reference id, e.g. "/link".
    pub id: String,

    /// Path to the JSON Schema.
    pub path: PathBuf,
}

/// A local JSON file and the schema it must satisfy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetCheck {
    /// Label used in logs.
    pub name: String,

    /// Path to the JSON document.
    pub document: PathBuf,

    /// Path to the JSON Schema.
    pub schema: PathBuf,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}
