//! Shared types used across mcbroker crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// Capacity tier of a pooled cache cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Small,
    Medium,
    Large,
}

impl Plan {
    /// Every recognized tier, smallest first.
    pub const ALL: [Plan; 3] = [Plan::Small, Plan::Medium, Plan::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Small => "small",
            Plan::Medium => "medium",
            Plan::Large => "large",
        }
    }

    /// Human-readable capacity summary shown in the plan listing.
    pub fn description(&self) -> &'static str {
        match self {
            Plan::Small => "Small - 1x CPU - 0.6 GB",
            Plan::Medium => "Medium - 2x CPU - 3.2 GB",
            Plan::Large => "Large - 2x CPU 6 GB",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| BrokerError::InvalidArgument(format!("unrecognized plan '{s}'")))
    }
}

/// Network address of a running cache node. Resolved per operation, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEndpoint {
    pub host: String,
    pub port: u16,
}

impl CacheEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for CacheEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One `STAT <key> <value>` line from a stats response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub key: String,
    pub value: String,
}

impl StatEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A key/value tag applied to a cloud resource through the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTag {
    pub resource_id: String,
    pub key: String,
    pub value: String,
}

impl ResourceTag {
    pub fn new(
        resource_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// The tag attributing `resource_id` to `billing_code`.
    pub fn billing(resource_id: impl Into<String>, billing_code: impl Into<String>) -> Self {
        Self::new(resource_id, BILLING_CODE_TAG, billing_code)
    }
}

/// Tag key used to attribute a claimed cluster to a billing code.
pub const BILLING_CODE_TAG: &str = "billingcode";
