//! Pool counters and in-flight tracking.
//!
//! # Responsibilities
//! - Count accepts, overflows, handler outcomes and accept errors
//! - Track handler invocations currently running
//! - Mirror every event into the metrics facade

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::config::OverflowPolicy;
use crate::observability::metrics;

/// Live counters shared by the acceptor and the workers.
#[derive(Debug, Default)]
pub struct PoolStats {
    accepted: AtomicU64,
    handled: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
    accept_errors: AtomicU64,
    ignored_errors: AtomicU64,
    in_flight: AtomicU64,
    queue_depth: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub accepted: u64,
    pub handled: u64,
    pub failed: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub accept_errors: u64,
    pub ignored_errors: u64,
    pub in_flight: u64,
    /// Contexts waiting for a worker at the last push or pop.
    pub queue_depth: u64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::SeqCst);
        metrics::record_accepted();
    }

    /// Record a failed accept; ignorable ones are counted separately.
    pub fn record_accept_error(&self, ignorable: bool) {
        if ignorable {
            self.ignored_errors.fetch_add(1, Ordering::SeqCst);
        } else {
            self.accept_errors.fetch_add(1, Ordering::SeqCst);
        }
        metrics::record_accept_error(ignorable);
    }

    pub fn record_overflow(&self, policy: OverflowPolicy) {
        match policy {
            OverflowPolicy::Drop => self.dropped.fetch_add(1, Ordering::SeqCst),
            OverflowPolicy::Reject => self.rejected.fetch_add(1, Ordering::SeqCst),
            OverflowPolicy::Block => return,
        };
        metrics::record_overflow(policy);
    }

    pub fn record_queue_depth(&self, depth: usize) {
        self.queue_depth.store(depth as u64, Ordering::SeqCst);
        metrics::record_queue_depth(depth);
    }

    /// Mark a handler invocation as started. The guard records the outcome.
    pub fn begin_request(&self) -> RequestGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_in_flight(now);
        RequestGuard {
            stats: self,
            start: Instant::now(),
            outcome: None,
        }
    }

    /// Get current in-flight handler count.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::SeqCst),
            handled: self.handled.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            rejected: self.rejected.load(Ordering::SeqCst),
            dropped: self.dropped.load(Ordering::SeqCst),
            accept_errors: self.accept_errors.load(Ordering::SeqCst),
            ignored_errors: self.ignored_errors.load(Ordering::SeqCst),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            queue_depth: self.queue_depth.load(Ordering::SeqCst),
        }
    }
}

/// How a handler invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Ok,
    Error,
    Panic,
}

impl RequestOutcome {
    fn as_str(self) -> &'static str {
        match self {
            RequestOutcome::Ok => "ok",
            RequestOutcome::Error => "error",
            RequestOutcome::Panic => "panic",
        }
    }
}

/// Guard that tracks one handler invocation.
/// Decrements the in-flight count when dropped.
#[derive(Debug)]
pub struct RequestGuard<'a> {
    stats: &'a PoolStats,
    start: Instant,
    outcome: Option<RequestOutcome>,
}

impl RequestGuard<'_> {
    pub fn finish(mut self, outcome: RequestOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        // A guard dropped without `finish` means the handler unwound past us.
        let outcome = self.outcome.unwrap_or(RequestOutcome::Panic);
        let counter = match outcome {
            RequestOutcome::Ok => &self.stats.handled,
            RequestOutcome::Error | RequestOutcome::Panic => &self.stats.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.stats.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_in_flight(now);
        metrics::record_request(outcome.as_str(), self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_guard_counts_outcomes() {
        let stats = PoolStats::new();

        let guard = stats.begin_request();
        assert_eq!(stats.in_flight(), 1);
        guard.finish(RequestOutcome::Ok);

        stats.begin_request().finish(RequestOutcome::Error);
        drop(stats.begin_request());

        let snap = stats.snapshot();
        assert_eq!(snap.handled, 1);
        assert_eq!(snap.failed, 2);
        assert_eq!(snap.in_flight, 0);
    }

    #[test]
    fn overflow_and_accept_errors_are_split() {
        let stats = PoolStats::new();
        stats.record_accepted();
        stats.record_overflow(OverflowPolicy::Drop);
        stats.record_overflow(OverflowPolicy::Reject);
        stats.record_overflow(OverflowPolicy::Block);
        stats.record_accept_error(true);
        stats.record_accept_error(false);

        let snap = stats.snapshot();
        assert_eq!(snap.accepted, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.ignored_errors, 1);
        assert_eq!(snap.accept_errors, 1);
    }

    #[test]
    fn queue_depth_keeps_latest_report() {
        let stats = PoolStats::new();
        stats.record_queue_depth(3);
        assert_eq!(stats.snapshot().queue_depth, 3);
        stats.record_queue_depth(0);
        assert_eq!(stats.snapshot().queue_depth, 0);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let stats = PoolStats::new();
        stats.record_accepted();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["accepted"], 1);
        assert_eq!(json["handled"], 0);
    }
}
