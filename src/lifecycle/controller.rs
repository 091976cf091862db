//! Lifecycle controller: owns the listener, the acceptor and the workers.
//!
//! # Responsibilities
//! - Start the listener, then the acceptor thread, then the workers
//! - Stop in reverse: listener, acceptor, workers, then close the listener
//! - Join every thread before `stop` returns
//! - Count live threads for shutdown checks

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::AcceptorConfig;
use crate::dispatch::{DispatchQueue, Gate};
use crate::lifecycle::state::{AtomicLifecycle, LifecycleState};
use crate::lifecycle::stats::{PoolStats, StatsSnapshot};
use crate::net::{IgnorableErrors, Listener, TcpAcceptListener};
use crate::pool::{acceptor, worker, PoolShared, RequestHandler};

/// Error type for server lifecycle operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start` called on a server that is not in `NotStarted`.
    #[error("server already started (state: {0})")]
    AlreadyStarted(LifecycleState),
    /// The listener could not be bound or started.
    #[error("failed to start listener: {0}")]
    Listener(#[source] io::Error),
    /// An acceptor or worker thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] io::Error),
    /// The configuration failed validation; every problem found is listed.
    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decrements the live thread count when a pool thread exits.
struct LiveThread(Arc<AtomicUsize>);

impl Drop for LiveThread {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A request acceptor with a fixed pool of worker threads.
///
/// Single use: once stopped, a server cannot be started again.
/// Dropping a running server stops it.
pub struct Server<L: Listener> {
    shared: Arc<PoolShared<L>>,
    state: AtomicLifecycle,
    max_workers: usize,
    thread_name: String,
    acceptor: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
    live_threads: Arc<AtomicUsize>,
}

impl<L: Listener> Server<L> {
    /// Create a server around `listener`. Nothing runs until [`Server::start`].
    pub fn new<H>(listener: L, config: &AcceptorConfig, handler: H) -> Result<Self, ServerError>
    where
        H: RequestHandler<L::Context>,
    {
        validate_config(config).map_err(ServerError::InvalidConfig)?;

        let shared = PoolShared {
            listener,
            queue: DispatchQueue::with_capacity(config.queue.capacity),
            work_available: Gate::new(),
            ready_to_accept: Arc::new(Gate::new()),
            space_available: Gate::new(),
            overflow: config.queue.overflow,
            handler: Box::new(handler),
            ignorable: IgnorableErrors::with_extra_codes(&config.errors.ignorable_os_codes),
            stats: Arc::new(PoolStats::new()),
            depth_report: Mutex::new(()),
        };

        Ok(Self {
            shared: Arc::new(shared),
            state: AtomicLifecycle::new(LifecycleState::NotStarted),
            max_workers: config.workers.max_workers,
            thread_name: config.workers.thread_name.clone(),
            acceptor: None,
            workers: Vec::with_capacity(config.workers.max_workers),
            live_threads: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Start listening, then spawn the acceptor and `max_workers` workers.
    pub fn start(&mut self) -> Result<(), ServerError> {
        let state = self.state.load();
        if state != LifecycleState::NotStarted {
            return Err(ServerError::AlreadyStarted(state));
        }

        self.shared.listener.start().map_err(ServerError::Listener)?;
        self.state.store(LifecycleState::Running);

        tracing::info!(
            prefix = %self.shared.listener.prefix(),
            workers = self.max_workers,
            queue_capacity = ?self.shared.queue.capacity(),
            overflow = %self.shared.overflow,
            "Server starting"
        );

        if let Err(e) = self.spawn_threads() {
            tracing::error!(error = %e, "Failed to spawn pool threads, shutting down");
            self.stop();
            return Err(ServerError::Spawn(e));
        }
        Ok(())
    }

    fn spawn_threads(&mut self) -> io::Result<()> {
        let shared = Arc::clone(&self.shared);
        self.acceptor = Some(self.spawn(format!("{}-acceptor", self.thread_name), move || {
            acceptor::run(&*shared)
        })?);

        for index in 0..self.max_workers {
            let shared = Arc::clone(&self.shared);
            let handle = self.spawn(format!("{}-worker-{}", self.thread_name, index), move || {
                worker::run(&*shared, index)
            })?;
            self.workers.push(handle);
        }
        Ok(())
    }

    fn spawn<F>(&self, name: String, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        self.live_threads.fetch_add(1, Ordering::SeqCst);
        let live = LiveThread(Arc::clone(&self.live_threads));
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _live = live;
                f()
            })
    }

    /// Stop accepting, drain the queue and join every thread.
    ///
    /// No-op unless running. Blocks until every in-flight handler returns.
    pub fn stop(&mut self) {
        if self
            .state
            .transition(LifecycleState::Running, LifecycleState::Stopping)
            .is_err()
        {
            return;
        }
        tracing::info!(prefix = %self.shared.listener.prefix(), "Server stopping");

        self.shared.listener.stop();
        self.shared.ready_to_accept.signal();
        if let Some(handle) = self.acceptor.take() {
            if handle.join().is_err() {
                tracing::error!("Acceptor thread panicked");
            }
        }

        self.shared.work_available.release_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        self.shared.listener.close();
        self.state.store(LifecycleState::Stopped);

        let stats = self.shared.stats.snapshot();
        tracing::info!(
            accepted = stats.accepted,
            handled = stats.handled,
            failed = stats.failed,
            "Server stopped"
        );
    }

    pub fn state(&self) -> LifecycleState {
        self.state.load()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    pub fn listener(&self) -> &L {
        &self.shared.listener
    }

    pub fn prefix(&self) -> &str {
        self.shared.listener.prefix()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Contexts accepted but not yet picked up by a worker.
    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Shared handle to the live counters, e.g. for a status endpoint.
    pub fn stats_handle(&self) -> Arc<PoolStats> {
        Arc::clone(&self.shared.stats)
    }

    /// Acceptor plus worker threads that have not exited yet.
    pub fn live_threads(&self) -> usize {
        self.live_threads.load(Ordering::SeqCst)
    }
}

impl Server<TcpAcceptListener> {
    /// Bind a TCP listener from `config.listener` and start serving.
    pub fn bind<H>(config: &AcceptorConfig, handler: H) -> Result<Self, ServerError>
    where
        H: RequestHandler<crate::net::HttpContext>,
    {
        validate_config(config).map_err(ServerError::InvalidConfig)?;
        let listener =
            TcpAcceptListener::from_config(&config.listener).map_err(ServerError::Listener)?;
        let mut server = Self::new(listener, config, handler)?;
        server.start()?;
        Ok(server)
    }

    /// Listen on `+:port` with the given scheme and pool size, defaults elsewhere.
    pub fn listen<H>(port: u16, secure: bool, max_workers: usize, handler: H) -> Result<Self, ServerError>
    where
        H: RequestHandler<crate::net::HttpContext>,
    {
        let mut config = AcceptorConfig::default();
        config.listener.port = port;
        config.listener.secure = secure;
        config.workers.max_workers = max_workers;
        Self::bind(&config, handler)
    }

    /// Address the TCP listener is bound to, while running.
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.shared.listener.local_addr()
    }
}

impl<L: Listener> Drop for Server<L> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<L: Listener> std::fmt::Debug for Server<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("prefix", &self.prefix())
            .field("state", &self.state())
            .field("max_workers", &self.max_workers)
            .field("live_threads", &self.live_threads())
            .finish()
    }
}
