//! Pool claim protocol.

use std::sync::Arc;

use mcbroker_core::{BrokerError, BrokerResult, CacheEndpoint, Plan, ResourceTag};
use mcbroker_gateway::CacheGateway;
use mcbroker_state::{ResourceStore, StateError};
use tracing::{info, warn};

/// A successfully claimed cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub name: String,
    pub endpoint: CacheEndpoint,
    /// Set when the billing tag could not be applied. The cluster is still
    /// claimed by this caller.
    pub tag_error: Option<String>,
}

/// Allocates pooled clusters to callers.
///
/// Stateless between calls: every claim goes to the store, every endpoint
/// to the gateway.
#[derive(Clone)]
pub struct PoolClaimer {
    store: Arc<dyn ResourceStore>,
    gateway: Arc<dyn CacheGateway>,
}

impl PoolClaimer {
    pub fn new(store: Arc<dyn ResourceStore>, gateway: Arc<dyn CacheGateway>) -> Self {
        Self { store, gateway }
    }

    /// Claim the oldest unclaimed cluster of `plan` for `billing_code`.
    ///
    /// Once the store has marked a cluster claimed it stays claimed, even if
    /// tagging or endpoint resolution fails afterwards.
    pub async fn claim(&self, plan: &str, billing_code: &str) -> BrokerResult<Claim> {
        let plan: Plan = plan.parse()?;

        let name = self
            .store
            .claim_oldest_unclaimed(plan)
            .map_err(store_unavailable)?
            .ok_or(BrokerError::PoolExhausted(plan))?;
        info!(%name, %plan, %billing_code, "pooled cluster claimed");

        let tag_error = match self.tag(&ResourceTag::billing(&name, billing_code)).await {
            Ok(()) => None,
            Err(e) => {
                warn!(%name, error = %e, "billing tag failed; cluster remains claimed");
                Some(e.to_string())
            }
        };

        let endpoint = match self.gateway.resolve_endpoint(&name).await {
            Ok(endpoint) => endpoint,
            Err(e) => {
                let detail = match &tag_error {
                    Some(tag) => format!(
                        "claimed cluster '{name}': tagging failed: {tag}; endpoint resolution failed: {e}"
                    ),
                    None => format!("claimed cluster '{name}': endpoint resolution failed: {e}"),
                };
                return Err(BrokerError::GatewayUnavailable(detail));
            }
        };

        Ok(Claim {
            name,
            endpoint,
            tag_error,
        })
    }

    /// Delete the cluster on the provider side, then forget its pool row.
    ///
    /// A failed cloud delete leaves the row untouched. A failed row delete
    /// after a successful cloud delete is a `PartialFailure`.
    pub async fn release(&self, name: &str) -> BrokerResult<()> {
        self.gateway.delete_resource(name).await?;
        info!(%name, "cache cluster deleted");

        match self.store.delete_row(name) {
            Ok(true) => {
                info!(%name, "pool row removed");
                Ok(())
            }
            Ok(false) => {
                warn!(%name, "cache cluster deleted but no pool row existed");
                Ok(())
            }
            Err(e) => Err(BrokerError::PartialFailure(format!(
                "cache cluster '{name}' deleted but pool row removal failed: {e}"
            ))),
        }
    }

    /// Apply an arbitrary tag to a cluster.
    pub async fn tag(&self, tag: &ResourceTag) -> BrokerResult<()> {
        self.gateway
            .add_tag(&tag.resource_id, &tag.key, &tag.value)
            .await
    }
}

fn store_unavailable(e: StateError) -> BrokerError {
    BrokerError::StoreUnavailable(e.to_string())
}
