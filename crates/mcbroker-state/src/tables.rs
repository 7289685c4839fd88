//! redb table definitions for the mcbroker state store.
//!
//! Each table uses `&str` keys (the cluster name) and `&[u8]` values
//! (JSON-serialized domain types).

use redb::TableDefinition;

/// Pooled resources keyed by `{name}`.
pub const POOL: TableDefinition<&str, &[u8]> = TableDefinition::new("pool");

/// Cluster registry records keyed by `{name}`.
pub const CLUSTERS: TableDefinition<&str, &[u8]> = TableDefinition::new("clusters");
