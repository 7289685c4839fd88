//! mcbroker-state: embedded pool store for mcbroker.
//!
//! Backed by [redb](https://docs.rs/redb), holds the pool of pre-provisioned
//! cache clusters and the cluster registry consulted by the registry gateway.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns,
//! keyed by resource name. Claims run inside a single write transaction;
//! redb admits one writer at a time, so select-and-mark is serialized
//! against every other claim.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{ResourceStore, StateStore};
pub use types::*;
