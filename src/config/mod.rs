//! Server settings subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → handed to the store, scheduler and HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; the remote document is what reloads
//! - All fields have defaults to allow minimal settings files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetCheck, AuthConfig, BaseSchema, Environment, FileServerConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RefreshConfig, ServerConfig, SourceConfig, TimeoutConfig,
    ValidationConfig,
};
