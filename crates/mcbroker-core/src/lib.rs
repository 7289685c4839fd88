pub mod config;
pub mod error;
pub mod types;

pub use config::BrokerConfig;
pub use error::{BrokerError, BrokerResult};
pub use types::*;
