//! Remote configuration server library.
//!
//! Serves a mobile app's remote configuration: which asset bundles each app
//! version should download, where they live and how large they are.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod remote_config;
pub mod resilience;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use remote_config::ConfigStore;
