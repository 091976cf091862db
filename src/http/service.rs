//! Bundled request handler: echoes the request line, serves pool stats.
//!
//! # Responsibilities
//! - `GET /stats`: JSON snapshot of the pool counters
//! - Anything else: plain-text echo of scheme, method and path
//! - Answer rejected connections with 503

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::http::request::read_request_head;
use crate::http::response::write_response;
use crate::lifecycle::stats::PoolStats;
use crate::net::HttpContext;
use crate::pool::{HandlerError, RequestHandler};

/// Default time allowed for a client to send its request head.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// The service run by the `http-acceptor` binary.
#[derive(Debug)]
pub struct StatusService {
    stats: OnceLock<Arc<PoolStats>>,
    read_timeout: Duration,
}

impl StatusService {
    pub fn new() -> Self {
        Self::with_read_timeout(DEFAULT_READ_TIMEOUT)
    }

    pub fn with_read_timeout(read_timeout: Duration) -> Self {
        Self {
            stats: OnceLock::new(),
            read_timeout,
        }
    }

    /// Connect the `/stats` endpoint to a running server's counters.
    pub fn attach_stats(&self, stats: Arc<PoolStats>) {
        let _ = self.stats.set(stats);
    }

    fn stats_body(&self) -> Result<Vec<u8>, HandlerError> {
        let snapshot = self
            .stats
            .get()
            .map(|stats| stats.snapshot())
            .unwrap_or_default();
        Ok(serde_json::to_vec(&snapshot)?)
    }
}

impl Default for StatusService {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestHandler<HttpContext> for StatusService {
    fn handle(&self, mut context: HttpContext) -> Result<(), HandlerError> {
        context.stream().set_read_timeout(Some(self.read_timeout))?;

        let Some(head) = read_request_head(&mut context)? else {
            tracing::debug!(connection_id = %context.id(), "Client closed before sending a request");
            return Ok(());
        };

        tracing::debug!(
            connection_id = %context.id(),
            peer_addr = %context.peer_addr(),
            method = %head.method,
            path = %head.path,
            "Request received"
        );

        if head.path == "/stats" {
            let body = self.stats_body()?;
            write_response(&mut context, 200, "application/json", &body)?;
        } else {
            let body = format!("{} {} {}\n", context.scheme(), head.method, head.path);
            write_response(&mut context, 200, "text/plain", body.as_bytes())?;
        }

        context.close()?;
        Ok(())
    }

    fn reject(&self, mut context: HttpContext) {
        if let Err(e) = write_response(&mut context, 503, "text/plain", b"server busy\n") {
            tracing::debug!(connection_id = %context.id(), error = %e, "Failed to send 503");
        }
    }
}
