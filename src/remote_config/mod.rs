//! Remote configuration subsystem.
//!
//! # Data Flow
//! ```text
//! refresh (scheduler tick, SIGHUP or GET /config/refresh):
//!     source.rs (HTTP GET or local file, mtime gate)
//!     → store.rs (skip unless lastUpdatedAt is newer)
//!     → placeholder.rs (substitute file server URL in every string)
//!     → schema.rs + validation.rs (JSON Schema, unique names)
//!     → sizes.rs (HEAD each asset for its size)
//!     → atomic swap of Arc<Snapshot>
//!
//! lookup (GET /config/{version}):
//!     load current Arc<Snapshot> → document.rs resolve(version)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a refresh builds a new one or changes nothing
//! - Refreshes are single-flight; lookups never wait for them
//! - A lookup before the first successful load is an error, not an empty map

pub mod document;
pub mod error;
pub mod placeholder;
pub mod scheduler;
pub mod schema;
pub mod sizes;
pub mod source;
pub mod store;
pub mod validation;

pub use document::{ConfigDocument, ConfigFile, ConfigFileVersion, Location, ResolvedFiles};
pub use error::{RemoteConfigError, ValidationFailure};
pub use scheduler::RefreshScheduler;
pub use store::{ConfigStore, RefreshOutcome, Snapshot, StoreInitError};
