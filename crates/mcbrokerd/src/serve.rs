//! `serve`: wires store, gateway, claimer, and control client into the API.

use std::net::SocketAddr;
use std::sync::Arc;

use mcbroker_api::ApiState;
use mcbroker_control::{CacheOperations, ControlClient};
use mcbroker_core::BrokerConfig;
use mcbroker_gateway::{CacheGateway, RegistryGateway};
use mcbroker_pool::PoolClaimer;
use mcbroker_state::StateStore;
use tracing::{info, warn};

pub async fn run(config: BrokerConfig) -> anyhow::Result<()> {
    info!("mcbroker daemon starting");

    if let Some(parent) = config.store.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = StateStore::open(&config.store.path)?;
    info!(path = ?config.store.path, "state store opened");

    let gateway: Arc<dyn CacheGateway> =
        Arc::new(RegistryGateway::new(store.clone(), &config.gateway));
    info!(region = %config.gateway.region, "registry gateway initialized");

    let client = ControlClient::from_config(&config.control)?;
    info!(
        connect_timeout = %config.control.connect_timeout,
        io_timeout = %config.control.io_timeout,
        "control client initialized"
    );

    let state = ApiState {
        claimer: PoolClaimer::new(Arc::new(store), gateway.clone()),
        operations: CacheOperations::new(gateway, client),
    };
    let router = mcbroker_api::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("mcbroker daemon stopped");
    Ok(())
}
