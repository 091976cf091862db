//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT / Ctrl+C
//! - Translate it into a server stop in the binary

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down");
        return;
    }
    tracing::info!("Shutdown signal received");
}
