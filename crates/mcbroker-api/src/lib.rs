//! mcbroker-api: REST API for the cache broker.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/v1/memcached/instance` | Claim a pooled cluster |
//! | DELETE | `/v1/memcached/instance/{name}` | Delete a cluster and its pool row |
//! | GET | `/v1/memcached/plans` | List plans |
//! | GET | `/v1/memcached/url/{name}` | Resolve a cluster's endpoint |
//! | POST | `/v1/tag` | Tag a cluster |
//! | GET | `/v1/memcached/operations/stats/{name}` | Fetch `stats` |
//! | DELETE | `/v1/memcached/operations/cache/{name}` | Issue `flush_all` |

pub mod handlers;

use axum::Router;
use axum::routing::{delete, get, post};
use mcbroker_control::CacheOperations;
use mcbroker_pool::PoolClaimer;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub claimer: PoolClaimer,
    pub operations: CacheOperations,
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let memcached_routes = Router::new()
        .route("/instance", post(handlers::provision))
        .route("/instance/{name}", delete(handlers::deprovision))
        .route("/plans", get(handlers::list_plans))
        .route("/url/{name}", get(handlers::get_url))
        .route("/operations/stats/{name}", get(handlers::get_stats))
        .route("/operations/cache/{name}", delete(handlers::flush_all));

    let v1_routes = Router::new()
        .nest("/memcached", memcached_routes)
        .route("/tag", post(handlers::tag));

    Router::new()
        .nest("/v1", v1_routes)
        .with_state(state)
}
