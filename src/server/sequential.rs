//! Sequential countdown server.
//!
//! Connections are handled one at a time: the accept loop waits for the
//! current exchange to finish, including connection close, before
//! accepting the next client. A slow client therefore delays everyone
//! behind it; no read timeout is applied.

use std::future::Future;
use std::io;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::handler;

/// Bind and serve until interrupted (or until `max_clients` is reached).
pub async fn run(config: Config) -> io::Result<()> {
    let listener = super::bind(&config.listen)?;
    info!(address = %config.listen, "Sequential server listening");
    serve(listener, config, super::shutdown_signal()).await
}

/// Accept loop, driven until `shutdown` resolves.
///
/// A handler failure terminates only that connection; the loop keeps
/// accepting. Accept errors are fatal and propagate to the caller.
pub(crate) async fn serve(
    listener: TcpListener,
    config: Config,
    shutdown: impl Future<Output = ()>,
) -> io::Result<()> {
    tokio::pin!(shutdown);

    let mut served = 0u64;
    while config.max_clients.map_or(true, |max| served < max) {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return Ok(());
            }
            accepted = listener.accept() => accepted?,
        };

        debug!(peer = %peer, "Connected");
        match handler::handle_connection(stream).await {
            Ok(()) => debug!(peer = %peer, "Completed"),
            Err(e) => warn!(peer = %peer, error = %e, "Connection error"),
        }
        served += 1;
    }

    Ok(())
}
