//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Acceptor thread
//!     → listener.rs (begin_accept with a one-shot AcceptCompletion)
//!     → tcp.rs / memory.rs (accept completes on some other thread)
//!     → AcceptCompletion::complete (stores outcome, signals "ready to accept")
//!     → Acceptor thread takes the context and queues it
//!
//! Listener States:
//!     Constructed → Listening → Stopped → Closed
//! ```
//!
//! # Design Decisions
//! - One accept in flight per acceptor; completion always signals exactly once
//! - Stopping a listener fails pending accepts with an ignorable error
//! - Socket errors expected during shutdown are classified in errors.rs

pub mod context;
pub mod errors;
pub mod listener;
pub mod memory;
pub mod tcp;

pub use context::{ConnectionId, HttpContext};
pub use errors::IgnorableErrors;
pub use listener::{listener_prefix, AcceptCompletion, AcceptOutcome, AcceptResult, Listener};
pub use memory::MemoryListener;
pub use tcp::TcpAcceptListener;
