//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize optional subsystems (metrics) from configuration
//! - Bind the TCP listener and start the pool
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to the caller
//! - Metrics start before the listener so the first accept is counted

use std::net::SocketAddr;

use crate::config::AcceptorConfig;
use crate::lifecycle::controller::{Server, ServerError};
use crate::net::{HttpContext, TcpAcceptListener};
use crate::observability::metrics;
use crate::pool::RequestHandler;

/// Start metrics (if enabled) and a TCP server for `config`.
pub fn launch<H>(config: &AcceptorConfig, handler: H) -> Result<Server<TcpAcceptListener>, ServerError>
where
    H: RequestHandler<HttpContext>,
{
    tracing::info!(
        bind_host = %config.listener.bind_host,
        port = config.listener.port,
        secure = config.listener.secure,
        max_workers = config.workers.max_workers,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    Server::bind(config, handler)
}
