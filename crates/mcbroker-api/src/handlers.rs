//! REST API handlers.
//!
//! Success bodies keep the field names existing broker clients read
//! (`MEMCACHED_URL`, `flush_all`, `response`). Failures are
//! `{"error": ..., "kind": ...}` with a status derived from the error kind.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mcbroker_core::{BrokerError, Plan, ResourceTag};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::ApiState;

/// Error body for every failed request.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

fn status_for(err: &BrokerError) -> StatusCode {
    match err {
        BrokerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        BrokerError::NotFound(_) => StatusCode::NOT_FOUND,
        BrokerError::PoolExhausted(_) => StatusCode::CONFLICT,
        BrokerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BrokerError::GatewayUnavailable(_)
        | BrokerError::EndpointUnreachable { .. }
        | BrokerError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
        BrokerError::TransportError(_) => StatusCode::GATEWAY_TIMEOUT,
        BrokerError::PartialFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: BrokerError) -> Response {
    let status = status_for(&err);
    warn!(kind = err.kind(), error = %err, %status, "request failed");
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
            kind: err.kind(),
        }),
    )
        .into_response()
}

/// Unwrap a JSON body, answering malformed ones with an `invalid_argument` error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        error_response(BrokerError::InvalidArgument(format!(
            "request body: {}",
            rejection.body_text()
        )))
    })
}

// ── Provisioning ───────────────────────────────────────────────

/// Provision request body.
#[derive(Debug, Deserialize, Serialize)]
pub struct ProvisionRequest {
    pub plan: String,
    pub billingcode: String,
}

/// POST /v1/memcached/instance
pub async fn provision(
    State(state): State<ApiState>,
    body: Result<Json<ProvisionRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    match state.claimer.claim(&req.plan, &req.billingcode).await {
        Ok(claim) => {
            let mut body = json!({
                "MEMCACHED_URL": claim.endpoint.to_string(),
                "resource": claim.name,
            });
            if let Some(tag_error) = claim.tag_error {
                body["tag_error"] = json!(tag_error);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /v1/memcached/instance/{name}
pub async fn deprovision(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.claimer.release(&name).await {
        Ok(()) => Json(json!({"response": "instance deleted", "resource": name})).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /v1/memcached/plans
pub async fn list_plans() -> impl IntoResponse {
    let plans: BTreeMap<&str, &str> = Plan::ALL
        .iter()
        .map(|plan| (plan.as_str(), plan.description()))
        .collect();
    Json(plans)
}

/// GET /v1/memcached/url/{name}
pub async fn get_url(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.operations.endpoint(&name).await {
        Ok(endpoint) => Json(json!({"MEMCACHED_URL": endpoint.to_string()})).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Tagging ────────────────────────────────────────────────────

/// Tag request body.
#[derive(Debug, Deserialize, Serialize)]
pub struct TagRequest {
    pub resource: String,
    pub name: String,
    pub value: String,
}

/// POST /v1/tag
pub async fn tag(
    State(state): State<ApiState>,
    body: Result<Json<TagRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let tag = ResourceTag::new(req.resource, req.name, req.value);
    match state.claimer.tag(&tag).await {
        Ok(()) => Json(json!({"response": "tag added"})).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Operations ─────────────────────────────────────────────────

/// GET /v1/memcached/operations/stats/{name}
pub async fn get_stats(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.operations.stats(&name).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /v1/memcached/operations/cache/{name}
pub async fn flush_all(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.operations.flush(&name).await {
        Ok(ack) => Json(json!({"flush_all": ack})).into_response(),
        Err(e) => error_response(e),
    }
}
