//! TCP listener with asynchronous, cancellable accepts.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Run accepts on a small tokio runtime, off the acceptor thread
//! - Hand accepted sockets over as blocking `HttpContext`s
//! - Cancel pending accepts on stop
//!
//! # Design Decisions
//! - The runtime is owned by the listener and shut down on close
//! - Cancelled accepts complete with `ConnectionAborted` (ignorable)

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::net::TcpListener;
use tokio::runtime::Runtime;

use crate::config::ListenerConfig;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::context::HttpContext;
use crate::net::listener::{listener_prefix, AcceptCompletion, Listener};

struct Bound {
    runtime: Runtime,
    listener: Arc<TcpListener>,
    local_addr: SocketAddr,
}

/// A TCP listener producing [`HttpContext`]s.
pub struct TcpAcceptListener {
    prefix: String,
    bind_addr: SocketAddr,
    secure: bool,
    listening: AtomicBool,
    shutdown: Shutdown,
    bound: Mutex<Option<Bound>>,
}

fn aborted() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "listener stopped")
}

impl TcpAcceptListener {
    /// Create an unbound listener for `host:port`. Nothing is bound until `start`.
    pub fn new(host: IpAddr, port: u16, secure: bool) -> Self {
        Self {
            prefix: listener_prefix(secure, port),
            bind_addr: SocketAddr::new(host, port),
            secure,
            listening: AtomicBool::new(false),
            shutdown: Shutdown::new(),
            bound: Mutex::new(None),
        }
    }

    /// Create a listener from the `[listener]` config section.
    pub fn from_config(config: &ListenerConfig) -> io::Result<Self> {
        let host: IpAddr = config
            .bind_host
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(Self::new(host, config.port, config.secure))
    }

    fn lock(&self) -> MutexGuard<'_, Option<Bound>> {
        self.bound.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Address actually bound, once started. Useful with port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock().as_ref().map(|b| b.local_addr)
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

impl Listener for TcpAcceptListener {
    type Context = HttpContext;

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn start(&self) -> io::Result<()> {
        let mut bound = self.lock();
        if bound.is_some() {
            return Ok(());
        }

        let std_listener = std::net::TcpListener::bind(self.bind_addr)?;
        std_listener.set_nonblocking(true)?;
        let local_addr = std_listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("acceptor-io")
            .enable_all()
            .build()?;

        // Dropping a runtime from an async caller panics; shut it down instead.
        let registered = {
            let _guard = runtime.enter();
            TcpListener::from_std(std_listener)
        };
        let listener = match registered {
            Ok(listener) => listener,
            Err(e) => {
                runtime.shutdown_background();
                return Err(e);
            }
        };

        tracing::info!(
            address = %local_addr,
            prefix = %self.prefix,
            "Listener bound"
        );

        *bound = Some(Bound {
            runtime,
            listener: Arc::new(listener),
            local_addr,
        });
        self.listening.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    fn begin_accept(&self, completion: AcceptCompletion<HttpContext>) {
        let bound = self.lock();
        let Some(bound) = bound.as_ref().filter(|_| self.is_listening()) else {
            completion.complete(Err(aborted()));
            return;
        };

        let listener = Arc::clone(&bound.listener);
        let mut shutdown = self.shutdown.subscribe();
        let secure = self.secure;

        bound.runtime.spawn(async move {
            let result = tokio::select! {
                accepted = listener.accept() => accepted
                    .and_then(|(stream, peer)| HttpContext::from_tokio(stream, peer, secure))
                    .map(Some),
                _ = shutdown.recv() => Err(aborted()),
            };
            completion.complete(result);
        });
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            tracing::info!(prefix = %self.prefix, "Listener stopped");
        }
        self.shutdown.trigger();
    }

    fn close(&self) {
        if let Some(bound) = self.lock().take() {
            drop(bound.listener);
            bound.runtime.shutdown_background();
            tracing::debug!(address = %bound.local_addr, "Listener closed");
        }
    }
}

impl Drop for TcpAcceptListener {
    fn drop(&mut self) {
        self.stop();
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Gate;
    use std::net::{Ipv4Addr, TcpStream};

    fn loopback() -> TcpAcceptListener {
        TcpAcceptListener::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, false)
    }

    #[test]
    fn accepts_a_connection() {
        let listener = loopback();
        listener.start().unwrap();
        assert!(listener.is_listening());
        let addr = listener.local_addr().unwrap();

        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::new(Arc::clone(&gate));
        listener.begin_accept(completion);

        let client = TcpStream::connect(addr).unwrap();
        gate.wait();
        let ctx = outcome.take().unwrap().unwrap().expect("context");
        assert_eq!(ctx.peer_addr(), client.local_addr().unwrap());
        assert!(!ctx.is_secure());

        listener.stop();
        listener.close();
    }

    #[test]
    fn stop_aborts_pending_accept() {
        let listener = loopback();
        listener.start().unwrap();

        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::new(Arc::clone(&gate));
        listener.begin_accept(completion);
        listener.stop();

        gate.wait();
        let err = outcome.take().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
        assert!(!listener.is_listening());
        listener.close();
        assert!(listener.local_addr().is_none());
    }

    #[test]
    fn accept_after_stop_fails_immediately() {
        let listener = loopback();
        listener.start().unwrap();
        listener.stop();

        let gate = Arc::new(Gate::new());
        let (completion, outcome) = AcceptCompletion::new(Arc::clone(&gate));
        listener.begin_accept(completion);
        assert!(outcome.take().unwrap().is_err());
    }

    #[test]
    fn prefix_reflects_scheme() {
        let listener = TcpAcceptListener::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8443, true);
        assert_eq!(listener.prefix(), "https://+:8443/");
        assert!(listener.is_secure());
    }
}
