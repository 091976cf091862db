//! The acceptor loop.
//!
//! # Responsibilities
//! - Keep exactly one accept in flight while the listener is active
//! - Queue every accepted context and wake a worker
//! - Apply the overflow policy when a bounded queue is full
//! - Log accept failures and keep going

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use crate::config::OverflowPolicy;
use crate::net::{AcceptCompletion, Listener};
use crate::pool::{panic_message, PoolShared};

/// How long to wait for a cancelled accept to report back after `stop`.
const CANCEL_GRACE: Duration = Duration::from_millis(100);

/// Run until the listener stops listening.
pub(crate) fn run<L: Listener>(shared: &PoolShared<L>) {
    tracing::debug!(prefix = %shared.listener.prefix(), "Acceptor loop started");

    while shared.listener.is_listening() {
        let (completion, outcome) = AcceptCompletion::new(Arc::clone(&shared.ready_to_accept));
        shared.listener.begin_accept(completion);
        shared.ready_to_accept.wait();

        let result = match outcome.take() {
            Some(result) => result,
            None => {
                // Woken by `stop` before the accept reported back.
                shared.ready_to_accept.wait_timeout(CANCEL_GRACE);
                match outcome.take() {
                    Some(result) => result,
                    None => break,
                }
            }
        };

        match result {
            Ok(Some(context)) => {
                shared.stats.record_accepted();
                enqueue(shared, context);
            }
            Ok(None) => {
                tracing::trace!("Accept completed without a context");
            }
            Err(e) if shared.ignorable.is_ignorable(&e) => {
                shared.stats.record_accept_error(true);
                tracing::debug!(error = %e, "Ignoring accept error");
            }
            Err(e) => {
                shared.stats.record_accept_error(false);
                tracing::error!(error = %e, "Accept failed");
            }
        }
    }

    tracing::debug!("Acceptor loop exited");
}

fn enqueue<L: Listener>(shared: &PoolShared<L>, context: L::Context) {
    let mut context = context;
    loop {
        match shared.queue.push(context) {
            Ok(()) => {
                let depth = shared.report_queue_depth();
                tracing::trace!(depth, "Context queued");
                shared.work_available.signal();
                return;
            }
            Err(back) => match shared.overflow {
                OverflowPolicy::Block => {
                    tracing::trace!("Dispatch queue full, waiting for a worker");
                    shared.work_available.signal();
                    shared.space_available.wait();
                    context = back;
                }
                OverflowPolicy::Drop => {
                    shared.stats.record_overflow(OverflowPolicy::Drop);
                    tracing::warn!(
                        capacity = ?shared.queue.capacity(),
                        "Dispatch queue full, dropping connection"
                    );
                    drop(back);
                    return;
                }
                OverflowPolicy::Reject => {
                    shared.stats.record_overflow(OverflowPolicy::Reject);
                    tracing::warn!(
                        capacity = ?shared.queue.capacity(),
                        "Dispatch queue full, rejecting connection"
                    );
                    let rejected =
                        panic::catch_unwind(AssertUnwindSafe(|| shared.handler.reject(back)));
                    if let Err(payload) = rejected {
                        tracing::error!(
                            panic = %panic_message(payload.as_ref()),
                            "Reject hook panicked"
                        );
                    }
                    return;
                }
            },
        }
    }
}
