//! Minimal HTTP/1.1 plumbing for the bundled service.
//!
//! # Data Flow
//! ```text
//! HttpContext (from a worker)
//!     → request.rs (read request line + headers, nothing more)
//!     → service.rs (pick a response)
//!     → response.rs (status line, headers, body; Connection: close)
//! ```
//!
//! # Design Decisions
//! - The acceptor core never parses HTTP; this lives entirely in the handler
//! - One request per connection, no keep-alive

pub mod request;
pub mod response;
pub mod service;

pub use request::{read_request_head, RequestHead};
pub use response::write_response;
pub use service::StatusService;
