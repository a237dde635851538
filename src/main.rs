//! countdown: a line-based TCP countdown server
//!
//! A client sends a single line containing an integer; the server
//! replies with the descending sequence from that value to 1, one
//! integer per line, then closes the connection.
//!
//! Two server variants share the wire protocol and business logic:
//! - Sequential: connections are handled one at a time on the accept loop
//! - Pooled: connections are dispatched to a fixed-size worker pool,
//!   with a graceful drain on shutdown
//!
//! Configuration via CLI arguments or TOML file.

mod config;
mod countdown;
mod handler;
mod pool;
mod protocol;
mod server;

use config::{Config, ServerMode};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        address = %config.listen,
        mode = ?config.mode,
        workers = config.workers,
        grace_period = config.grace_period,
        "Starting countdown server"
    );

    match config.mode {
        ServerMode::Sequential => server::sequential::run(config).await?,
        ServerMode::Pooled => server::pooled::run(config).await?,
    }

    Ok(())
}
