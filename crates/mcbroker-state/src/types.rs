//! Domain types for the mcbroker state store.
//!
//! All types are serializable to/from JSON for storage in redb tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use mcbroker_core::{CacheEndpoint, Plan};

// ── Pool ──────────────────────────────────────────────────────────

/// A pre-provisioned cache cluster waiting in (or claimed from) the pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PooledResource {
    /// Cluster identifier, unique across the pool.
    pub name: String,
    pub plan: Plan,
    /// Set once when the resource is handed out; never cleared.
    pub claimed: bool,
    /// Unix timestamp (milliseconds) when fulfillment added the cluster.
    pub created_at: u64,
}

impl PooledResource {
    /// A fresh, unclaimed pool entry.
    pub fn unclaimed(name: impl Into<String>, plan: Plan, created_at: u64) -> Self {
        Self {
            name: name.into(),
            plan,
            claimed: false,
            created_at,
        }
    }

    /// Whether this resource may be claimed for `plan`.
    pub fn is_eligible(&self, plan: Plan) -> bool {
        self.plan == plan && !self.claimed
    }

    /// FIFO ordering key: creation time, then name.
    fn age_key(&self) -> (u64, &str) {
        (self.created_at, self.name.as_str())
    }

    /// Whether `self` should be claimed before `other`.
    pub fn is_older_than(&self, other: &PooledResource) -> bool {
        self.age_key() < other.age_key()
    }
}

// ── Cluster registry ──────────────────────────────────────────────

/// Registry entry describing where a cluster lives and how it is tagged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterRecord {
    pub name: String,
    /// Provider resource name the tags are attached to.
    pub arn: String,
    pub host: String,
    pub port: u16,
    pub tags: BTreeMap<String, String>,
}

impl ClusterRecord {
    pub fn endpoint(&self) -> CacheEndpoint {
        CacheEndpoint::new(self.host.clone(), self.port)
    }
}
