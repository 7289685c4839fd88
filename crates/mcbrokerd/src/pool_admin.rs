//! `pool add` / `pool list`: out-of-band fulfillment of the pool.

use std::time::{SystemTime, UNIX_EPOCH};

use mcbroker_core::{BrokerConfig, CacheEndpoint, Plan};
use mcbroker_gateway::RegistryGateway;
use mcbroker_state::{PooledResource, StateStore};
use tracing::info;

fn open_store(config: &BrokerConfig) -> anyhow::Result<StateStore> {
    if let Some(parent) = config.store.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(StateStore::open(&config.store.path)?)
}

fn now_millis() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64)
}

pub fn add(
    config: &BrokerConfig,
    name: &str,
    plan: &str,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let plan: Plan = plan.parse()?;
    let store = open_store(config)?;

    if store.get_resource(name)?.is_some() {
        anyhow::bail!("cluster '{name}' is already pooled");
    }

    let gateway = RegistryGateway::new(store.clone(), &config.gateway);
    let record = gateway.register(name, &CacheEndpoint::new(host, port))?;
    store.put_resource(&PooledResource::unclaimed(name, plan, now_millis()?))?;

    info!(%name, %plan, arn = %record.arn, "cluster added to pool");
    println!("added {name} ({plan}) at {host}:{port}");
    Ok(())
}

pub fn list(config: &BrokerConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let resources = store.list_resources()?;
    println!("{}", serde_json::to_string_pretty(&resources)?);
    Ok(())
}
