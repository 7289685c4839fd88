//! mcbroker-pool: hands out pre-provisioned cache clusters.
//!
//! [`PoolClaimer`] claims the oldest unclaimed cluster of a plan from a
//! [`ResourceStore`](mcbroker_state::ResourceStore), tags it with the
//! caller's billing code through a
//! [`CacheGateway`](mcbroker_gateway::CacheGateway), and returns its
//! endpoint. It also releases clusters back to nothing (cloud delete, then
//! row delete) and passes tag requests through.

pub mod claimer;

pub use claimer::{Claim, PoolClaimer};
