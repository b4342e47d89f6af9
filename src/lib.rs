//! Reverse proxy serving a single-page app in front of a CouchDB-style
//! database backend.
//!
//! # Architecture Overview
//!
//! ```text
//! Client ──▶ gzip override ──▶ compression ──▶ SPA fallback ──▶ router
//!                                                                 │
//!                  /hoodie/_all_dbs      synthetic 404 ◀──────────┤
//!                  /hoodie/admin/{p*}    admin assets  ◀──────────┤
//!                  /hoodie/bundle*.js    client bundles ◀─────────┤
//!                  /hoodie/{p*}          proxy ──▶ backend ◀──────┤
//!                  /{p*}                 web root (SPA)  ◀────────┘
//! ```
//!
//! The proxy leg rewrites credentials in both directions: an inbound
//! `Authorization: Bearer <token>` header becomes the backend's
//! `AuthSession` cookie, and a login response's `Set-Cookie` value is
//! lifted into the JSON body as `bearerToken` so clients never handle the
//! raw cookie.

pub mod config;
pub mod http;
pub mod lifecycle;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
