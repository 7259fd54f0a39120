//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Document fetch:
//!     → retries.rs (bounded attempts)
//!     → backoff.rs (exponential delay + jitter between attempts)
//! ```
//!
//! # Design Decisions
//! - Every outbound call has a deadline (set on the HTTP client)
//! - Only the document fetch is retried; size lookups degrade per entry

pub mod backoff;
pub mod retries;

pub use retries::{retry_with_backoff, RetryPolicy};
