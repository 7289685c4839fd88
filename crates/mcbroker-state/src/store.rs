//! StateStore: redb-backed persistence for the mcbroker pool.
//!
//! Provides typed operations over pooled resources and the cluster
//! registry. All values are JSON-serialized into redb's `&[u8]` value
//! columns. The store supports both on-disk and in-memory backends (the
//! latter for testing).

use std::path::Path;
use std::sync::Arc;

use mcbroker_core::Plan;
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// The two pool operations the claimer depends on.
///
/// `claim_oldest_unclaimed` must select and mark in one indivisible step:
/// two concurrent callers for the same plan never receive the same name.
pub trait ResourceStore: Send + Sync {
    /// Mark the oldest unclaimed resource of `plan` as claimed and return
    /// its name, or `None` when the plan's pool is empty.
    fn claim_oldest_unclaimed(&self, plan: Plan) -> StateResult<Option<String>>;

    /// Remove a resource row. Returns true if it existed.
    fn delete_row(&self, name: &str) -> StateResult<bool>;
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(POOL).map_err(map_err!(Table))?;
        txn.open_table(CLUSTERS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Pool ───────────────────────────────────────────────────────

    /// Insert or replace a pooled resource.
    pub fn put_resource(&self, resource: &PooledResource) -> StateResult<()> {
        let value = serde_json::to_vec(resource).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(POOL).map_err(map_err!(Table))?;
            table
                .insert(resource.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(name = %resource.name, plan = %resource.plan, "pooled resource stored");
        Ok(())
    }

    /// Get a pooled resource by name.
    pub fn get_resource(&self, name: &str) -> StateResult<Option<PooledResource>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(POOL).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let resource: PooledResource =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(resource))
            }
            None => Ok(None),
        }
    }

    /// List every pooled resource, claimed or not.
    pub fn list_resources(&self) -> StateResult<Vec<PooledResource>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(POOL).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let resource: PooledResource =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(resource);
        }
        Ok(results)
    }

    /// Atomically claim the oldest eligible resource for `plan`.
    ///
    /// The scan and the update share one write transaction. redb serializes
    /// write transactions, so a concurrent claim observes either none or all
    /// of this claim's effect.
    pub fn claim_oldest(&self, plan: Plan) -> StateResult<Option<PooledResource>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let claimed = {
            let mut table = txn.open_table(POOL).map_err(map_err!(Table))?;
            let mut oldest: Option<PooledResource> = None;
            for entry in table.iter().map_err(map_err!(Read))? {
                let (_, value) = entry.map_err(map_err!(Read))?;
                let resource: PooledResource =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                if resource.is_eligible(plan)
                    && oldest.as_ref().is_none_or(|o| resource.is_older_than(o))
                {
                    oldest = Some(resource);
                }
            }

            match oldest {
                Some(mut resource) => {
                    resource.claimed = true;
                    let value = serde_json::to_vec(&resource).map_err(map_err!(Serialize))?;
                    table
                        .insert(resource.name.as_str(), value.as_slice())
                        .map_err(map_err!(Write))?;
                    Some(resource)
                }
                None => None,
            }
        };

        match claimed {
            Some(resource) => {
                txn.commit().map_err(map_err!(Transaction))?;
                debug!(name = %resource.name, %plan, "pooled resource claimed");
                Ok(Some(resource))
            }
            None => {
                txn.abort().map_err(map_err!(Transaction))?;
                debug!(%plan, "no unclaimed resource for plan");
                Ok(None)
            }
        }
    }

    /// Delete a pooled resource by name. Returns true if it existed.
    pub fn delete_resource(&self, name: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(POOL).map_err(map_err!(Table))?;
            existed = table.remove(name).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, existed, "pooled resource deleted");
        Ok(existed)
    }

    // ── Cluster registry ───────────────────────────────────────────

    /// Insert or replace a cluster registry record.
    pub fn put_cluster(&self, record: &ClusterRecord) -> StateResult<()> {
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(CLUSTERS).map_err(map_err!(Table))?;
            table
                .insert(record.name.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(name = %record.name, host = %record.host, port = record.port, "cluster registered");
        Ok(())
    }

    /// Get a cluster registry record by name.
    pub fn get_cluster(&self, name: &str) -> StateResult<Option<ClusterRecord>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CLUSTERS).map_err(map_err!(Table))?;
        match table.get(name).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: ClusterRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Set `key = value` on a cluster's tags (last write wins).
    /// Returns false if the cluster is not registered.
    pub fn tag_cluster(&self, name: &str, key: &str, value: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let tagged = {
            let mut table = txn.open_table(CLUSTERS).map_err(map_err!(Table))?;
            let existing = match table.get(name).map_err(map_err!(Read))? {
                Some(guard) => Some(
                    serde_json::from_slice::<ClusterRecord>(guard.value())
                        .map_err(map_err!(Deserialize))?,
                ),
                None => None,
            };
            match existing {
                Some(mut record) => {
                    record.tags.insert(key.to_string(), value.to_string());
                    let bytes = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
                    table
                        .insert(name, bytes.as_slice())
                        .map_err(map_err!(Write))?;
                    true
                }
                None => false,
            }
        };
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, %key, tagged, "cluster tag applied");
        Ok(tagged)
    }

    /// Delete a cluster registry record. Returns true if it existed.
    pub fn delete_cluster(&self, name: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(CLUSTERS).map_err(map_err!(Table))?;
            existed = table.remove(name).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%name, existed, "cluster deregistered");
        Ok(existed)
    }
}

impl ResourceStore for StateStore {
    fn claim_oldest_unclaimed(&self, plan: Plan) -> StateResult<Option<String>> {
        Ok(self.claim_oldest(plan)?.map(|resource| resource.name))
    }

    fn delete_row(&self, name: &str) -> StateResult<bool> {
        self.delete_resource(name)
    }
}
