//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router implementing the fixed route table
//! - Wire up middleware (trace, timeout, gzip override, compression,
//!   SPA fallback)
//! - Serve static assets (web root, admin dashboard, client bundles)
//! - Dispatch API requests to the generic proxy handler
//!
//! # Route table (most specific first; literal segments beat wildcards)
//! ```text
//! GET  /hoodie/_all_dbs      synthetic 404 (deliberately disabled)
//! GET  /hoodie/admin/{p*}    admin dashboard assets, index fallback
//! GET  /hoodie/bundle.js     fixed client bundle file
//! GET  /hoodie/bundle.min.js fixed minified bundle file
//! *    /hoodie[/{p*}]        reverse proxy to the backend
//! *    /{p*}                 web root assets, index fallback
//! ```
//! Non-GET methods on the override paths fall through to the proxy, which
//! matches the per-method route semantics of the table above.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{delete, options, post, put, MethodRouter},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::GatewayConfig;
use crate::http::middleware::{force_gzip_override, spa_fallback, SpaFallbackExempt};
use crate::http::proxy::proxy_handler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub backend_base: Url,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given (validated) configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);

        let backend_base = config
            .backend
            .base_url()
            .expect("backend descriptor validated at startup");

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: config.clone(),
            backend_base,
            client,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all routes and middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let assets = &config.assets;
        let admin_assets =
            ServeDir::new(&assets.admin_dir).append_index_html_on_directories(true);
        let web_root = ServeDir::new(&assets.www_dir).append_index_html_on_directories(true);

        Router::new()
            .route("/hoodie/_all_dbs", proxy_methods().get(all_dbs_disabled))
            .route(
                "/hoodie/bundle.js",
                proxy_methods().get_service(ServeFile::new(&assets.bundle_js)),
            )
            .route(
                "/hoodie/bundle.min.js",
                proxy_methods().get_service(ServeFile::new(&assets.bundle_min_js)),
            )
            .nest("/hoodie/admin", admin_routes(admin_assets))
            .route("/hoodie", proxy_methods().get(proxy_handler))
            .route("/hoodie/", proxy_methods().get(proxy_handler))
            .route("/hoodie/{*path}", proxy_methods().get(proxy_handler))
            .fallback_service(web_root)
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(middleware::from_fn(force_gzip_override))
                    .layer(CompressionLayer::new())
                    .layer(middleware::from_fn_with_state(state, spa_fallback)),
            )
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.host_header(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Methods the proxy accepts besides GET. The GET slot differs per route
/// (synthetic handler, bundle file, or the proxy itself).
fn proxy_methods() -> MethodRouter<AppState> {
    put(proxy_handler)
        .post(proxy_handler)
        .delete(proxy_handler)
        .options(proxy_handler)
}

/// Admin dashboard routes: GET serves assets (with the nest prefix already
/// stripped), every other method falls through to the generic proxy.
fn admin_routes(assets: ServeDir) -> Router<AppState> {
    Router::new()
        .route("/", proxy_methods().get_service(assets.clone()))
        .route("/{*path}", proxy_methods().get_service(assets))
}

/// Database enumeration is deliberately disabled on the public surface.
async fn all_dbs_disabled() -> Response {
    let mut response = (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
    )
        .into_response();
    // This is a crafted reply, not a routing miss; the SPA fallback must
    // not rewrite it for browsers.
    response.extensions_mut().insert(SpaFallbackExempt);
    response
}
