//! Concurrent HTTP request acceptor with a bounded worker-thread pool.
//!
//! A [`Server`] owns a [`Listener`](net::Listener), accepts connections on a
//! dedicated acceptor thread, queues them, and hands each one to exactly one
//! of `max_workers` worker threads running a caller-supplied
//! [`RequestHandler`](pool::RequestHandler).

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod pool;

pub use config::AcceptorConfig;
pub use lifecycle::{LifecycleState, Server, ServerError};
pub use net::{HttpContext, MemoryListener, TcpAcceptListener};
pub use pool::{handler_fn, HandlerError, RequestHandler};
