//! mcbroker-gateway: the cloud control-plane boundary.
//!
//! The broker never talks to a provider SDK directly. Everything it needs
//! from the control plane (endpoint resolution, tagging, deletion) goes
//! through the [`CacheGateway`] trait, injected at construction so tests can
//! substitute fakes.
//!
//! [`RegistryGateway`] is the shipped implementation: it answers from the
//! cluster registry that fulfillment writes into the state store.

pub mod arn;
pub mod registry;

use std::future::Future;
use std::pin::Pin;

use mcbroker_core::{BrokerResult, CacheEndpoint};

pub use arn::cluster_arn;
pub use registry::RegistryGateway;

/// Boxed future alias for gateway operations.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = BrokerResult<T>> + Send + 'a>>;

/// Control-plane operations consumed by the claimer and the cache operations.
///
/// Implementations report an unknown cluster as `BrokerError::NotFound` and
/// any other control-plane failure as `BrokerError::GatewayUnavailable`.
pub trait CacheGateway: Send + Sync {
    /// Resolve a cluster name to its current network endpoint.
    fn resolve_endpoint<'a>(&'a self, name: &'a str) -> GatewayFuture<'a, CacheEndpoint>;

    /// Apply (or overwrite) a tag on a cluster.
    fn add_tag<'a>(
        &'a self,
        name: &'a str,
        key: &'a str,
        value: &'a str,
    ) -> GatewayFuture<'a, ()>;

    /// Delete the cluster on the provider side.
    fn delete_resource<'a>(&'a self, name: &'a str) -> GatewayFuture<'a, ()>;
}
