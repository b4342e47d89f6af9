//! Process signal handling.

use crate::lifecycle::Shutdown;

/// Trigger the shutdown coordinator once the process receives ctrl-c.
pub async fn watch_signals(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
