//! Broker regression tests.
//!
//! Drives the full router (store, registry gateway, claimer, control
//! client) against fake cache nodes listening on loopback.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mcbroker_api::{ApiState, build_router};
use mcbroker_control::{CacheOperations, ControlClient};
use mcbroker_core::config::GatewayConfig;
use mcbroker_core::{CacheEndpoint, Plan};
use mcbroker_gateway::{CacheGateway, RegistryGateway};
use mcbroker_pool::PoolClaimer;
use mcbroker_state::{PooledResource, StateStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

struct Harness {
    router: Router,
    store: StateStore,
    gateway: RegistryGateway,
}

fn harness() -> Harness {
    let store = StateStore::open_in_memory().unwrap();
    let gateway = RegistryGateway::new(store.clone(), &GatewayConfig::default());
    let shared: Arc<dyn CacheGateway> = Arc::new(gateway.clone());
    let state = ApiState {
        claimer: PoolClaimer::new(Arc::new(store.clone()), shared.clone()),
        operations: CacheOperations::new(
            shared,
            ControlClient::new(Duration::from_secs(2), Duration::from_secs(2)),
        ),
    };
    Harness {
        router: build_router(state),
        store,
        gateway,
    }
}

impl Harness {
    fn pool(&self, name: &str, plan: Plan, created_at: u64, endpoint: CacheEndpoint) {
        self.store
            .put_resource(&PooledResource::unclaimed(name, plan, created_at))
            .unwrap();
        self.gateway.register(name, &endpoint).unwrap();
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

/// Fake cache node answering every half-closed request with `response`.
async fn fake_node(response: &'static str) -> CacheEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = Vec::new();
                if socket.read_to_end(&mut request).await.is_ok() {
                    let _ = socket.write_all(response.as_bytes()).await;
                }
            });
        }
    });
    CacheEndpoint::new("127.0.0.1", port)
}

fn provision_request(plan: &str, billingcode: &str) -> Request<Body> {
    let body = serde_json::json!({"plan": plan, "billingcode": billingcode});
    Request::builder()
        .method("POST")
        .uri("/v1/memcached/instance")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn provision_claims_oldest_and_tags_it() {
    let h = harness();
    h.pool("mc-new", Plan::Small, 2000, CacheEndpoint::new("10.0.0.2", 11211));
    h.pool("mc-old", Plan::Small, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let (status, body) = h.send(provision_request("small", "cc-100")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["MEMCACHED_URL"], "10.0.0.1:11211");
    assert_eq!(body["resource"], "mc-old");
    let record = h.store.get_cluster("mc-old").unwrap().unwrap();
    assert_eq!(record.tags["billingcode"], "cc-100");
    assert!(!h.store.get_resource("mc-new").unwrap().unwrap().claimed);
}

#[tokio::test]
async fn provision_exhausts_pool() {
    let h = harness();
    h.pool("mc-a", Plan::Large, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let (status, _) = h.send(provision_request("large", "cc")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h.send(provision_request("large", "cc")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "pool_exhausted");
    assert_eq!(body["error"], "no unclaimed resource available for plan large");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_provisioning_hands_out_distinct_clusters() {
    let h = Arc::new(harness());
    for i in 0..8u64 {
        h.pool(
            &format!("mc-{i}"),
            Plan::Medium,
            1000 + i,
            CacheEndpoint::new(format!("10.0.1.{i}"), 11211),
        );
    }

    let tasks: Vec<_> = (0..9)
        .map(|i| {
            let h = h.clone();
            tokio::spawn(async move {
                h.send(provision_request("medium", &format!("cc-{i}")))
                    .await
            })
        })
        .collect();

    let mut urls = std::collections::HashSet::new();
    let mut conflicts = 0;
    for task in tasks {
        let (status, body) = task.await.unwrap();
        if status == StatusCode::OK {
            assert!(urls.insert(body["MEMCACHED_URL"].to_string()));
        } else if status == StatusCode::CONFLICT {
            conflicts += 1;
        } else {
            panic!("unexpected status {status}");
        }
    }
    assert_eq!(urls.len(), 8);
    assert_eq!(conflicts, 1);
}

#[tokio::test]
async fn plans_and_url_lookup() {
    let h = harness();
    h.pool("mc-a", Plan::Small, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let (status, body) = h.send(get("/v1/memcached/plans")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().unwrap().len(), 3);

    let (status, body) = h.send(get("/v1/memcached/url/mc-a")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["MEMCACHED_URL"], "10.0.0.1:11211");

    let (status, body) = h.send(get("/v1/memcached/url/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn stats_and_flush_over_control_channel() {
    let h = harness();
    let stats_node = fake_node("STAT pid 123\r\nSTAT uptime 456\r\nEND\r\n").await;
    let flush_node = fake_node("  OK\r\n").await;
    h.pool("mc-stats", Plan::Small, 1000, stats_node);
    h.pool("mc-flush", Plan::Small, 1001, flush_node);

    let (status, body) = h.send(get("/v1/memcached/operations/stats/mc-stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([
            {"key": "pid", "value": "123"},
            {"key": "uptime", "value": "456"}
        ])
    );

    let (status, body) = h.send(delete("/v1/memcached/operations/cache/mc-flush")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["flush_all"], "OK");
}

#[tokio::test]
async fn malformed_stats_is_reported() {
    let h = harness();
    let node = fake_node("STAT onlykey\r\n").await;
    h.pool("mc-bad", Plan::Small, 1000, node);

    let (status, body) = h.send(get("/v1/memcached/operations/stats/mc-bad")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "malformed_response");
}

#[tokio::test]
async fn tag_then_deprovision() {
    let h = harness();
    h.pool("mc-a", Plan::Medium, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let tag = serde_json::json!({"resource": "mc-a", "name": "owner", "value": "search"});
    let req = Request::builder()
        .method("POST")
        .uri("/v1/tag")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&tag).unwrap()))
        .unwrap();
    let (status, body) = h.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "tag added");

    let (status, _) = h.send(delete("/v1/memcached/instance/mc-a")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.store.get_resource("mc-a").unwrap().is_none());
    assert!(h.store.get_cluster("mc-a").unwrap().is_none());

    let (status, body) = h.send(delete("/v1/memcached/instance/mc-a")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn provision_with_incomplete_body_is_invalid_argument() {
    let h = harness();
    h.pool("mc-a", Plan::Small, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let req = Request::builder()
        .method("POST")
        .uri("/v1/memcached/instance")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"plan":"small"}"#))
        .unwrap();
    let (status, body) = h.send(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");
    assert!(body["error"].as_str().unwrap().contains("billingcode"));
    assert!(!h.store.get_resource("mc-a").unwrap().unwrap().claimed);
}

#[tokio::test]
async fn tag_without_json_content_type_is_invalid_argument() {
    let h = harness();
    h.pool("mc-a", Plan::Small, 1000, CacheEndpoint::new("10.0.0.1", 11211));

    let req = Request::builder()
        .method("POST")
        .uri("/v1/tag")
        .body(Body::from("resource=mc-a"))
        .unwrap();
    let (status, body) = h.send(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");
    assert!(h.store.get_cluster("mc-a").unwrap().unwrap().tags.is_empty());
}
