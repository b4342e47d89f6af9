//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend descriptor resolves to a usable base URL
//! - Check all configured asset paths exist on disk
//! - Validate value ranges (timeouts > 0, port valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; a request handler never
//!   sees an invalid backend descriptor or a missing asset root

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    BindAddress(String),

    #[error("unsupported backend scheme `{0}` (only plain-http upstreams are supported)")]
    BackendScheme(String),

    #[error("backend hostname must not be empty")]
    BackendHostname,

    #[error("backend port must not be zero")]
    BackendPort,

    #[error("backend descriptor does not form a valid URL: {0}")]
    BackendUrl(#[from] url::ParseError),

    #[error("{role} `{path}` does not exist")]
    MissingAsset { role: &'static str, path: String },

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("limit `max_body_bytes` must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let backend = &config.backend;
    if backend.scheme != "http" {
        errors.push(ValidationError::BackendScheme(backend.scheme.clone()));
    }
    if backend.hostname.is_empty() {
        errors.push(ValidationError::BackendHostname);
    }
    if backend.port == 0 {
        errors.push(ValidationError::BackendPort);
    }
    if let Err(e) = backend.base_url() {
        errors.push(ValidationError::BackendUrl(e));
    }

    let assets = &config.assets;
    check_dir(&mut errors, "web root", &assets.www_dir);
    check_file(&mut errors, "SPA entry document", &assets.index_file());
    check_dir(&mut errors, "admin asset root", &assets.admin_dir);
    check_file(&mut errors, "client bundle", &assets.bundle_js);
    check_file(&mut errors, "minified client bundle", &assets.bundle_min_js);

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_dir(errors: &mut Vec<ValidationError>, role: &'static str, path: &Path) {
    if !path.is_dir() {
        errors.push(ValidationError::MissingAsset {
            role,
            path: path.display().to_string(),
        });
    }
}

fn check_file(errors: &mut Vec<ValidationError>, role: &'static str, path: &Path) {
    if !path.is_file() {
        errors.push(ValidationError::MissingAsset {
            role,
            path: path.display().to_string(),
        });
    }
}
