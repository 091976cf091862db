//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Acceptor thread
//!     → queue.rs (push accepted context, FIFO)
//!     → gate.rs ("work available" signal)
//!     → Worker threads (wake, try_pop, run handler)
//!
//! Accept completion (any thread)
//!     → gate.rs ("ready to accept" signal)
//!     → Acceptor thread resumes
//! ```
//!
//! # Design Decisions
//! - The queue pop is the only mutual exclusion on the dequeue path
//! - Gates are latched flags, so a signal sent before the wait is never lost
//! - Waiters clear the flag, signalers only set it
//! - Shutdown releases a gate permanently instead of signaling it

pub mod gate;
pub mod queue;

pub use gate::Gate;
pub use queue::DispatchQueue;
