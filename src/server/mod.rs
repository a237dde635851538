//! Server variants sharing the countdown wire protocol.
//!
//! Both variants run the same per-connection handler; they differ only
//! in how connections are scheduled:
//! - `sequential`: one connection at a time on the accept loop
//! - `pooled`: connections dispatched to a fixed-size worker pool

pub mod pooled;
pub mod sequential;

use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpSocket};
use tracing::error;

/// Listen backlog for the server socket.
const BACKLOG: u32 = 1024;

/// Bind a listening socket with SO_REUSEADDR set.
pub(crate) fn bind(listen: &str) -> io::Result<TcpListener> {
    let addr: SocketAddr = listen.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid listen address '{listen}': {e}"),
        )
    })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

/// Resolve when the process receives an interrupt signal.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install interrupt handler");
        // Without a signal handler there is no shutdown path; park forever
        // rather than tearing the server down.
        std::future::pending::<()>().await;
    }
}
