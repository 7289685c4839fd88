//! Error taxonomy shared by the claimer, gateway, and control-channel client.

use thiserror::Error;

use crate::types::Plan;

/// Result type alias for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Every failure a broker operation can report. Each variant carries a
/// human-readable detail; [`BrokerError::kind`] gives a stable tag for callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no unclaimed resource available for plan {0}")]
    PoolExhausted(Plan),

    #[error("resource store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("cloud cache gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("endpoint {endpoint} unreachable: {detail}")]
    EndpointUnreachable { endpoint: String, detail: String },

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The cloud side of a release succeeded but local cleanup did not.
    /// Requires manual reconciliation.
    #[error("partial failure: {0}")]
    PartialFailure(String),
}

impl BrokerError {
    /// Stable snake_case identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::InvalidArgument(_) => "invalid_argument",
            BrokerError::PoolExhausted(_) => "pool_exhausted",
            BrokerError::StoreUnavailable(_) => "store_unavailable",
            BrokerError::GatewayUnavailable(_) => "gateway_unavailable",
            BrokerError::NotFound(_) => "not_found",
            BrokerError::EndpointUnreachable { .. } => "endpoint_unreachable",
            BrokerError::TransportError(_) => "transport_error",
            BrokerError::MalformedResponse(_) => "malformed_response",
            BrokerError::PartialFailure(_) => "partial_failure",
        }
    }
}
