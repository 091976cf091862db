//! In-process listener fed by injected contexts.
//!
//! Accepts complete in injection order, from the injecting thread or, when
//! a context is already waiting, synchronously inside `begin_accept`.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::net::listener::{AcceptCompletion, AcceptResult, Listener};

struct State<C> {
    pending: Option<AcceptCompletion<C>>,
    backlog: VecDeque<io::Result<C>>,
}

/// A listener whose connections are supplied by the caller.
pub struct MemoryListener<C> {
    prefix: String,
    listening: AtomicBool,
    accepts_issued: AtomicU64,
    state: Mutex<State<C>>,
}

impl<C: Send + 'static> MemoryListener<C> {
    pub fn new() -> Self {
        Self::with_prefix("memory://+:0/")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            listening: AtomicBool::new(false),
            accepts_issued: AtomicU64::new(0),
            state: Mutex::new(State {
                pending: None,
                backlog: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a new connection as if a client had connected.
    pub fn inject(&self, context: C) {
        self.deliver(Ok(context));
    }

    /// Make the next accept fail with `err`.
    pub fn inject_error(&self, err: io::Error) {
        self.deliver(Err(err));
    }

    fn deliver(&self, item: io::Result<C>) {
        let mut state = self.lock();
        match state.pending.take() {
            Some(completion) => {
                drop(state);
                completion.complete(item.map(Some));
            }
            None => state.backlog.push_back(item),
        }
    }

    /// Injected items not yet picked up by an accept.
    pub fn backlog_len(&self) -> usize {
        self.lock().backlog.len()
    }

    /// Whether an accept is currently waiting for a connection.
    pub fn has_pending_accept(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Total `begin_accept` calls so far.
    pub fn accepts_issued(&self) -> u64 {
        self.accepts_issued.load(Ordering::SeqCst)
    }
}

impl<C: Send + 'static> Default for MemoryListener<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn aborted() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "listener stopped")
}

impl<C: Send + 'static> Listener for MemoryListener<C> {
    type Context = C;

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn start(&self) -> io::Result<()> {
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn begin_accept(&self, completion: AcceptCompletion<C>) {
        self.accepts_issued.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        let ready: Option<AcceptResult<C>> = if !self.is_listening() {
            Some(Err(aborted()))
        } else {
            state.backlog.pop_front().map(|item| item.map(Some))
        };
        match ready {
            Some(result) => {
                drop(state);
                completion.complete(result);
            }
            None => state.pending = Some(completion),
        }
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
        let pending = {
            let mut state = self.lock();
            state.backlog.clear();
            state.pending.take()
        };
        if let Some(completion) = pending {
            completion.complete(Err(aborted()));
        }
    }

    fn close(&self) {
        let mut state = self.lock();
        state.backlog.clear();
        state.pending = None;
    }
}
