//! Acceptor loop and worker pool.
//!
//! # Data Flow
//! ```text
//! acceptor.rs (1 thread)
//!     → listener.begin_accept → wait "ready to accept"
//!     → push context into DispatchQueue → signal "work available"
//!
//! worker.rs (max_workers threads)
//!     → wait "work available" while the queue is empty
//!     → try_pop → handler.rs (outside any lock)
//! ```
//!
//! # Design Decisions
//! - All shared state lives in one `PoolShared`, passed by `Arc`
//! - Handler errors and panics are contained per request
//! - Workers leave only once the acceptor is gone and the queue is drained

pub mod acceptor;
pub mod handler;
pub mod worker;

use std::sync::{Arc, Mutex, PoisonError};

pub use handler::{handler_fn, FnHandler, HandlerError, RequestHandler};

use crate::config::OverflowPolicy;
use crate::dispatch::{DispatchQueue, Gate};
use crate::lifecycle::stats::PoolStats;
use crate::net::{IgnorableErrors, Listener};

/// State shared by the controller, the acceptor and every worker.
pub(crate) struct PoolShared<L: Listener> {
    pub listener: L,
    pub queue: DispatchQueue<L::Context>,
    /// Set on every enqueue; released for good once the acceptor has exited.
    pub work_available: Gate,
    /// Set once per accept completion, and once by `stop`.
    pub ready_to_accept: Arc<Gate>,
    /// Set by workers after each pop; only waited on with a bounded queue.
    pub space_available: Gate,
    pub overflow: OverflowPolicy,
    pub handler: Box<dyn RequestHandler<L::Context>>,
    pub ignorable: IgnorableErrors,
    pub stats: Arc<PoolStats>,
    /// Serializes depth reports so the last one reflects the last push or pop.
    pub depth_report: Mutex<()>,
}

impl<L: Listener> PoolShared<L> {
    /// Publish the current queue length to stats and metrics.
    pub fn report_queue_depth(&self) -> usize {
        let _report = self.depth_report.lock().unwrap_or_else(PoisonError::into_inner);
        let depth = self.queue.len();
        self.stats.record_queue_depth(depth);
        depth
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
