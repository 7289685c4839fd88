//! mcbroker-control: administrative control channel to cache nodes.
//!
//! Each command runs over its own TCP connection:
//!
//! ```text
//! connect ─▶ write "<command>\n" ─▶ shutdown(write) ─▶ read to EOF ─▶ drop
//! ```
//!
//! The response is framed by the peer closing the connection, not by the
//! `END` terminator line. Only `stats` and `flush_all` are spoken.

pub mod client;
pub mod operations;
pub mod protocol;

pub use client::ControlClient;
pub use operations::CacheOperations;
pub use protocol::{parse_flush_response, parse_stats};
