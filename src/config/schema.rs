//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The database backend all `/hoodie` API traffic is forwarded to.
    pub backend: BackendConfig,

    /// Static asset roots served alongside the API.
    pub assets: AssetConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request/response size limits.
    pub limits: LimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The single upstream database backend.
///
/// Immutable after startup and shared read-only by every request handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// URL scheme used to reach the backend.
    pub scheme: String,

    /// Backend hostname.
    pub hostname: String,

    /// Backend port.
    pub port: u16,

    /// Optional admin username. Local-only credential material; never part
    /// of the resolved upstream URL.
    pub username: Option<String>,

    /// Optional admin password. Same rules as `username`.
    pub password: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            hostname: "127.0.0.1".to_string(),
            port: 5984,
            username: None,
            password: None,
        }
    }
}

impl BackendConfig {
    /// Resolve the base URL requests are forwarded to.
    ///
    /// Credentials are deliberately excluded: the upstream authenticates via
    /// the per-request `AuthSession` cookie, never via URL userinfo.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}://{}:{}/", self.scheme, self.hostname, self.port))
    }

    /// The `host` header value the backend expects.
    pub fn host_header(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// Static asset roots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Web root holding the single-page app (must contain `index.html`).
    pub www_dir: PathBuf,

    /// Asset root of the admin dashboard.
    pub admin_dir: PathBuf,

    /// Pre-built client bundle served at `/hoodie/bundle.js`.
    pub bundle_js: PathBuf,

    /// Minified client bundle served at `/hoodie/bundle.min.js`.
    pub bundle_min_js: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            www_dir: PathBuf::from("www"),
            admin_dir: PathBuf::from("admin"),
            bundle_js: PathBuf::from("client/bundle.js"),
            bundle_min_js: PathBuf::from("client/bundle.min.js"),
        }
    }
}

impl AssetConfig {
    /// The SPA entry document substituted for HTML-accepting 404s.
    pub fn index_file(&self) -> PathBuf {
        self.www_dir.join("index.html")
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout (client-facing) in seconds.
    pub request_secs: u64,

    /// Timeout for a single upstream exchange in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 20,
        }
    }
}

/// Request/response size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum upstream response body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
