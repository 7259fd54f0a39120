//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load settings → Validate assets → Build store → Listen → Initial refresh
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop scheduler → Stop accepting → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger configuration refresh
//! ```
//!
//! # Design Decisions
//! - Fail fast: invalid settings or assets are fatal
//! - A failed initial refresh is not fatal; lookups report not-initialized
//!   until a later refresh succeeds

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
