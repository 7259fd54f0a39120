//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID, request span)
//!     → middleware/auth.rs (Authorization gate)
//!     → handlers.rs (lookup / refresh against the store)
//!       or assets.rs (static files, development only)
//!     → Send to client
//! ```

pub mod assets;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
