//! Listener abstraction with completion-based accepts.
//!
//! # Responsibilities
//! - Define the contract every listener (TCP, in-memory) implements
//! - Carry an accept outcome from the completing thread to the acceptor
//! - Guarantee the "ready to accept" gate is signaled once per accept

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use crate::dispatch::Gate;

/// Outcome of one accept: a context, nothing (listener stopped mid-accept), or an error.
pub type AcceptResult<C> = io::Result<Option<C>>;

type Slot<C> = Arc<Mutex<Option<AcceptResult<C>>>>;

/// Build the listener prefix, e.g. `http://+:8080/`.
pub fn listener_prefix(secure: bool, port: u16) -> String {
    let scheme = if secure { "https" } else { "http" };
    format!("{}://+:{}/", scheme, port)
}

/// A network listener that accepts connections asynchronously.
///
/// `begin_accept` must return without blocking; the accept finishes later
/// by calling [`AcceptCompletion::complete`] from whatever thread the
/// listener uses for I/O. Dropping the completion instead counts as an
/// accept that produced no context.
pub trait Listener: Send + Sync + 'static {
    /// The per-connection handle given to the request handler.
    type Context: Send + 'static;

    /// Listener prefix, `scheme://+:<port>/`.
    fn prefix(&self) -> &str;

    /// Bind and begin listening.
    fn start(&self) -> io::Result<()>;

    /// Whether the listener still accepts connections.
    fn is_listening(&self) -> bool;

    /// Start one asynchronous accept.
    fn begin_accept(&self, completion: AcceptCompletion<Self::Context>);

    /// Stop accepting. Pending accepts fail with an ignorable error.
    fn stop(&self);

    /// Release the underlying socket and I/O resources.
    fn close(&self);
}

/// One-shot completion handle for a single accept.
///
/// Completing (or dropping) it stores the outcome and signals the
/// "ready to accept" gate exactly once.
pub struct AcceptCompletion<C> {
    slot: Slot<C>,
    ready: Arc<Gate>,
    done: bool,
}

/// Acceptor-side view of an accept issued with [`AcceptCompletion`].
pub struct AcceptOutcome<C> {
    slot: Slot<C>,
}

impl<C> AcceptCompletion<C> {
    /// Create a completion that signals `ready`, plus the outcome to read it back.
    pub fn new(ready: Arc<Gate>) -> (Self, AcceptOutcome<C>) {
        let slot = Arc::new(Mutex::new(None));
        let completion = Self {
            slot: Arc::clone(&slot),
            ready,
            done: false,
        };
        (completion, AcceptOutcome { slot })
    }

    /// Finish the accept with `result`.
    pub fn complete(mut self, result: AcceptResult<C>) {
        self.store(result);
    }

    fn store(&mut self, result: AcceptResult<C>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        self.done = true;
        self.ready.signal();
    }
}

impl<C> Drop for AcceptCompletion<C> {
    fn drop(&mut self) {
        if !self.done {
            self.store(Ok(None));
        }
    }
}

impl<C> AcceptOutcome<C> {
    /// Take the outcome if the accept has finished.
    pub fn take(&self) -> Option<AcceptResult<C>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::gate::Wake;
    use std::time::Duration;

    #[test]
    fn prefix_uses_scheme_and_port() {
        assert_eq!(listener_prefix(false, 8080), "http://+:8080/");
        assert_eq!(listener_prefix(true, 443), "https://+:443/");
    }

    #[test]
    fn complete_signals_and_stores() {
        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::new(Arc::clone(&gate));
        assert!(outcome.take().is_none());

        completion.complete(Ok(Some(7u32)));
        assert_eq!(gate.wait(), Wake::Signaled);
        assert_eq!(outcome.take().unwrap().unwrap(), Some(7));
        assert!(outcome.take().is_none());
    }

    #[test]
    fn dropped_completion_still_signals_once() {
        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::<u32>::new(Arc::clone(&gate));
        drop(completion);

        assert_eq!(gate.wait(), Wake::Signaled);
        assert_eq!(outcome.take().unwrap().unwrap(), None);
        assert_eq!(gate.wait_timeout(Duration::from_millis(20)), Wake::TimedOut);
    }

    #[test]
    fn error_completion_is_delivered() {
        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::<u32>::new(Arc::clone(&gate));
        completion.complete(Err(io::Error::from(io::ErrorKind::ConnectionReset)));

        gate.wait();
        let err = outcome.take().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
