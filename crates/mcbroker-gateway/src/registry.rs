//! Registry-backed gateway.
//!
//! Fulfillment registers each pooled cluster (name, endpoint) in the state
//! store's cluster registry. This gateway resolves, tags, and deletes
//! against that registry.

use std::collections::BTreeMap;

use mcbroker_core::config::GatewayConfig;
use mcbroker_core::{BrokerError, BrokerResult, CacheEndpoint};
use mcbroker_state::{ClusterRecord, StateError, StateStore};
use tracing::{debug, info};

use crate::arn::cluster_arn;
use crate::{CacheGateway, GatewayFuture};

/// [`CacheGateway`] answering from the cluster registry.
#[derive(Clone)]
pub struct RegistryGateway {
    store: StateStore,
    region: String,
    account_number: String,
}

impl RegistryGateway {
    pub fn new(store: StateStore, config: &GatewayConfig) -> Self {
        Self {
            store,
            region: config.region.clone(),
            account_number: config.account_number.clone(),
        }
    }

    /// Provider resource name for `name` in this gateway's region/account.
    pub fn arn(&self, name: &str) -> String {
        cluster_arn(&self.region, &self.account_number, name)
    }

    /// Record a freshly provisioned cluster so it can later be resolved.
    pub fn register(&self, name: &str, endpoint: &CacheEndpoint) -> BrokerResult<ClusterRecord> {
        let record = ClusterRecord {
            name: name.to_string(),
            arn: self.arn(name),
            host: endpoint.host.clone(),
            port: endpoint.port,
            tags: BTreeMap::new(),
        };
        self.store.put_cluster(&record).map_err(unavailable)?;
        info!(%name, arn = %record.arn, %endpoint, "cluster registered");
        Ok(record)
    }

    fn resolve(&self, name: &str) -> BrokerResult<CacheEndpoint> {
        match self.store.get_cluster(name).map_err(unavailable)? {
            Some(record) => {
                debug!(%name, endpoint = %record.endpoint(), "endpoint resolved");
                Ok(record.endpoint())
            }
            None => Err(BrokerError::NotFound(format!("cache cluster '{name}'"))),
        }
    }

    fn tag(&self, name: &str, key: &str, value: &str) -> BrokerResult<()> {
        let arn = self.arn(name);
        if self.store.tag_cluster(name, key, value).map_err(unavailable)? {
            info!(%arn, %key, %value, "tag added");
            Ok(())
        } else {
            Err(BrokerError::NotFound(format!("cache cluster '{arn}'")))
        }
    }

    fn delete(&self, name: &str) -> BrokerResult<()> {
        if self.store.delete_cluster(name).map_err(unavailable)? {
            info!(%name, "cache cluster deleted");
            Ok(())
        } else {
            Err(BrokerError::NotFound(format!("cache cluster '{name}'")))
        }
    }
}

fn unavailable(e: StateError) -> BrokerError {
    BrokerError::GatewayUnavailable(e.to_string())
}

impl CacheGateway for RegistryGateway {
    fn resolve_endpoint<'a>(&'a self, name: &'a str) -> GatewayFuture<'a, CacheEndpoint> {
        Box::pin(async move { self.resolve(name) })
    }

    fn add_tag<'a>(
        &'a self,
        name: &'a str,
        key: &'a str,
        value: &'a str,
    ) -> GatewayFuture<'a, ()> {
        Box::pin(async move { self.tag(name, key, value) })
    }

    fn delete_resource<'a>(&'a self, name: &'a str) -> GatewayFuture<'a, ()> {
        Box::pin(async move { self.delete(name) })
    }
}
