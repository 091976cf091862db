//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Acceptor / workers / controller produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Connection IDs flow through every log line about a context
//! - Metrics are cheap (no-ops until a recorder is installed)

pub mod logging;
pub mod metrics;
