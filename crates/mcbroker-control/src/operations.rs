//! Name-addressed cache operations: resolve through the gateway, then
//! drive the control channel.

use std::sync::Arc;

use mcbroker_core::{BrokerResult, CacheEndpoint, StatEntry};
use mcbroker_gateway::CacheGateway;
use tracing::info;

use crate::client::ControlClient;

/// Operational commands against a cluster identified by name.
///
/// The endpoint is resolved on every call; clusters may be re-created at a
/// new address between calls.
#[derive(Clone)]
pub struct CacheOperations {
    gateway: Arc<dyn CacheGateway>,
    client: ControlClient,
}

impl CacheOperations {
    pub fn new(gateway: Arc<dyn CacheGateway>, client: ControlClient) -> Self {
        Self { gateway, client }
    }

    /// Current endpoint of the named cluster.
    pub async fn endpoint(&self, name: &str) -> BrokerResult<CacheEndpoint> {
        self.gateway.resolve_endpoint(name).await
    }

    pub async fn stats(&self, name: &str) -> BrokerResult<Vec<StatEntry>> {
        let endpoint = self.endpoint(name).await?;
        self.client.fetch_stats(&endpoint).await
    }

    pub async fn flush(&self, name: &str) -> BrokerResult<String> {
        let endpoint = self.endpoint(name).await?;
        let ack = self.client.flush_all(&endpoint).await?;
        info!(%name, %endpoint, %ack, "cache flushed");
        Ok(ack)
    }
}
