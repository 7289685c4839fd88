//! One-shot control-channel client.

use std::time::Duration;

use mcbroker_core::config::ControlConfig;
use mcbroker_core::{BrokerError, BrokerResult, CacheEndpoint, StatEntry};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::protocol::{FLUSH_ALL_COMMAND, STATS_COMMAND, parse_flush_response, parse_stats};

/// Issues single administrative commands to a cache node.
///
/// Holds no connections: every call dials, exchanges one command, and tears
/// the socket down. Dropping the returned future closes the socket.
#[derive(Debug, Clone)]
pub struct ControlClient {
    /// Timeout for establishing the TCP connection.
    connect_timeout: Duration,
    /// Timeout for the write, half-close, and read-to-EOF exchange.
    io_timeout: Duration,
}

impl ControlClient {
    pub fn new(connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            io_timeout,
        }
    }

    pub fn from_config(config: &ControlConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.connect_timeout()?, config.io_timeout()?))
    }

    /// Fetch `STAT` entries in response order.
    pub async fn fetch_stats(&self, endpoint: &CacheEndpoint) -> BrokerResult<Vec<StatEntry>> {
        let bytes = self.exchange(endpoint, STATS_COMMAND).await?;
        let body = String::from_utf8(bytes).map_err(|e| {
            BrokerError::MalformedResponse(format!("non-utf8 stats response from {endpoint}: {e}"))
        })?;
        let stats = parse_stats(&body)?;
        debug!(%endpoint, count = stats.len(), "stats fetched");
        Ok(stats)
    }

    /// Flush every item; returns the node's trimmed acknowledgement.
    ///
    /// The reply is not validated; invalid UTF-8 is replaced, never rejected.
    pub async fn flush_all(&self, endpoint: &CacheEndpoint) -> BrokerResult<String> {
        let bytes = self.exchange(endpoint, FLUSH_ALL_COMMAND).await?;
        let ack = parse_flush_response(&String::from_utf8_lossy(&bytes));
        debug!(%endpoint, %ack, "flush_all acknowledged");
        Ok(ack)
    }

    /// Send `command`, half-close, and read until the peer closes.
    async fn exchange(&self, endpoint: &CacheEndpoint, command: &str) -> BrokerResult<Vec<u8>> {
        let addr = endpoint.to_string();
        let unreachable = |detail: String| BrokerError::EndpointUnreachable {
            endpoint: addr.clone(),
            detail,
        };

        let mut stream = match tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(addr.as_str()),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(unreachable(e.to_string())),
            Err(_) => {
                return Err(unreachable(format!(
                    "connect timed out after {:?}",
                    self.connect_timeout
                )));
            }
        };
        let _ = stream.set_nodelay(true);
        debug!(%addr, command = command.trim_end(), "control channel connected");

        let exchange = async {
            stream
                .write_all(command.as_bytes())
                .await
                .map_err(|e| BrokerError::TransportError(format!("write to {addr}: {e}")))?;
            // Half-close: the peer sees EOF on its read side and answers.
            stream
                .shutdown()
                .await
                .map_err(|e| BrokerError::TransportError(format!("half-close to {addr}: {e}")))?;
            let mut buf = Vec::new();
            stream
                .read_to_end(&mut buf)
                .await
                .map_err(|e| BrokerError::TransportError(format!("read from {addr}: {e}")))?;
            Ok::<_, BrokerError>(buf)
        };

        let buf = match tokio::time::timeout(self.io_timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BrokerError::TransportError(format!(
                    "no response from {addr} within {:?}",
                    self.io_timeout
                )));
            }
        };

        debug!(%addr, bytes = buf.len(), "control channel response read");
        Ok(buf)
    }
}
