//! Worker threads draining the dispatch queue.

use std::panic::{self, AssertUnwindSafe};

use crate::lifecycle::stats::RequestOutcome;
use crate::net::Listener;
use crate::pool::{panic_message, PoolShared};

/// Run until the pool is released and the queue is empty.
pub(crate) fn run<L: Listener>(shared: &PoolShared<L>, index: usize) {
    tracing::debug!(worker = index, "Worker started");

    loop {
        if let Some(context) = shared.queue.try_pop() {
            shared.report_queue_depth();
            if shared.queue.capacity().is_some() {
                shared.space_available.signal();
            }
            // More work queued behind this one: hand it to an idle peer.
            if !shared.queue.is_empty() {
                shared.work_available.signal();
            }
            dispatch(shared, index, context);
            continue;
        }

        if shared.work_available.is_released() {
            break;
        }
        shared.work_available.wait();
    }

    tracing::debug!(worker = index, "Worker exited");
}

fn dispatch<L: Listener>(shared: &PoolShared<L>, index: usize, context: L::Context) {
    tracing::trace!(worker = index, "Dispatching request");
    let request = shared.stats.begin_request();

    match panic::catch_unwind(AssertUnwindSafe(|| shared.handler.handle(context))) {
        Ok(Ok(())) => request.finish(RequestOutcome::Ok),
        Ok(Err(e)) => {
            if shared.ignorable.is_ignorable_dyn(e.as_ref()) {
                tracing::debug!(worker = index, error = %e, "Request ended by connection error");
            } else {
                tracing::error!(worker = index, error = %e, "Request handler failed");
            }
            request.finish(RequestOutcome::Error);
        }
        Err(payload) => {
            tracing::error!(
                worker = index,
                panic = %panic_message(payload.as_ref()),
                "Request handler panicked"
            );
            request.finish(RequestOutcome::Panic);
        }
    }
}
