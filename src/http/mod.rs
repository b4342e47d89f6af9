//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route table, middleware stack)
//!     → middleware.rs (gzip negotiation override)
//!     → [route dispatch: synthetic / static / proxy]
//!     → proxy.rs (forward to backend)
//!         → headers.rs (outbound credential + host rewrite)
//!         → session.rs (inbound bearer-token extraction)
//!     → middleware.rs (SPA fallback for HTML 404s)
//!     → Send to client
//! ```

pub mod headers;
pub mod middleware;
pub mod proxy;
pub mod server;
pub mod session;

pub use server::{AppState, HttpServer};
