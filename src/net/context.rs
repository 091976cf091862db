//! Per-connection context handed from the listener to a worker.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Own the accepted stream until the handler is done with it
//! - Expose peer address and scheme to the handler

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An accepted TCP connection waiting for, or owned by, a worker.
///
/// The stream is in blocking mode. The connection is closed when the
/// context is dropped, after the handler returns.
#[derive(Debug)]
pub struct HttpContext {
    id: ConnectionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
    secure: bool,
}

impl HttpContext {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, secure: bool) -> Self {
        Self {
            id: ConnectionId::new(),
            stream,
            peer_addr,
            secure,
        }
    }

    /// Convert a stream accepted on the I/O runtime into a blocking context.
    pub(crate) fn from_tokio(
        stream: tokio::net::TcpStream,
        peer_addr: SocketAddr,
        secure: bool,
    ) -> io::Result<Self> {
        let stream = stream.into_std()?;
        stream.set_nonblocking(false)?;
        Ok(Self::new(stream, peer_addr, secure))
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `https` or `http`, from the listener prefix.
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }

    /// Flush and close both directions.
    pub fn close(mut self) -> io::Result<()> {
        self.stream.flush()?;
        self.stream.shutdown(Shutdown::Both)
    }
}

impl Read for HttpContext {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for HttpContext {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
