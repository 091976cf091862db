//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (controller.rs):
//!     Validate config → Start listener → Spawn acceptor → Spawn workers
//!
//! Stop (controller.rs):
//!     Stop listener → Wake acceptor → Join acceptor
//!         → Release workers → Join workers → Close listener
//!
//! Shutdown (shutdown.rs):
//!     Listener stop → Cancel pending accepts on the I/O runtime
//! ```
//!
//! # Design Decisions
//! - Ordered startup: listener first, then acceptor, then workers
//! - Ordered shutdown: stop accept, drain queue, join, close
//! - Single use: NotStarted → Running → Stopping → Stopped
//! - No shutdown deadline: `stop` waits for in-flight handlers

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;
pub mod stats;

pub use controller::{Server, ServerError};
pub use shutdown::Shutdown;
pub use state::LifecycleState;
pub use stats::{PoolStats, StatsSnapshot};
