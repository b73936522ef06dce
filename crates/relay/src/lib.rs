//! Relay Engine: the single-threaded, readiness-driven loop that moves
//! plaintext between a framed socket and a local endpoint (stdio, or a
//! subprocess's pipes in exec mode), plus the connect/listen helpers and
//! chat-mode presentation it depends on.
//!
//! Rust's std runtime ignores `SIGPIPE` at process start, so a write to a
//! dead peer surfaces here as an ordinary `io::Error` rather than killing
//! the process — the C ancestor's explicit `ignore_sigpipe()` call has no
//! equivalent to write because the behavior is already the default.

mod chat;
mod endpoint;
mod engine;
mod error;
mod net;

pub use chat::ChatRenderer;
pub use endpoint::LocalEndpoint;
pub use engine::{run, RelayOptions, RelayOutcome, RelayStats};
pub use error::{RelayError, Result};
pub use net::{connect_with_timeout, listen_and_accept_one};
