//! mcbrokerd: the mcbroker daemon.
//!
//! Serves the broker REST API over a redb-backed pool, and administers the
//! pool from the command line.
//!
//! # Usage
//!
//! ```text
//! mcbrokerd --config /etc/mcbroker/broker.toml serve --port 5000
//! mcbrokerd pool add --name mc-small-01 --plan small --host 10.0.4.12 --port 11211
//! mcbrokerd pool list
//! ```

mod pool_admin;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mcbroker_core::BrokerConfig;

#[derive(Parser)]
#[command(name = "mcbrokerd", about = "Memcached cluster broker daemon")]
struct Cli {
    /// Path to broker.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the broker API.
    Serve {
        /// Port to listen on (overrides config and PORT).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Administer the pool of pre-provisioned clusters.
    Pool {
        #[command(subcommand)]
        action: PoolCommand,
    },
}

#[derive(Subcommand)]
enum PoolCommand {
    /// Add an unclaimed cluster to the pool and register its endpoint.
    Add {
        #[arg(long)]
        name: String,
        /// One of: small, medium, large.
        #[arg(long)]
        plan: String,
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "11211")]
        port: u16,
    },
    /// Print every pooled cluster as JSON.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,mcbrokerd=debug,mcbroker_pool=debug,mcbroker_control=debug".into()
                }),
        )
        .init();

    let cli = Cli::parse();
    let mut config = BrokerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve::run(config).await
        }
        Command::Pool { action } => match action {
            PoolCommand::Add {
                name,
                plan,
                host,
                port,
            } => pool_admin::add(&config, &name, &plan, &host, port),
            PoolCommand::List => pool_admin::list(&config),
        },
    }
}
