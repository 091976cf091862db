//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AcceptorConfig (validated, immutable)
//!     → handed to Server::new / Server::bind
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new listen session takes a new config
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AcceptorConfig;
pub use schema::ErrorConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::OverflowPolicy;
pub use schema::QueueConfig;
pub use schema::WorkerConfig;
