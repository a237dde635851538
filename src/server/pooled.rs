//! Pooled countdown server.
//!
//! The accept loop never handles a connection itself: each accepted
//! stream is submitted to a [`WorkerPool`](crate::pool::WorkerPool),
//! so up to `workers` exchanges run concurrently while submission stays
//! non-blocking. On shutdown the loop stops accepting and drains the
//! pool under the configured grace period.

use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::handler;
use crate::pool::{DrainOutcome, WorkerPool};

/// Bind and serve until interrupted (or until `max_clients` is reached).
pub async fn run(config: Config) -> io::Result<()> {
    let listener = super::bind(&config.listen)?;
    info!(
        address = %config.listen,
        workers = config.workers,
        "Pooled server listening"
    );
    serve(listener, config, super::shutdown_signal()).await
}

/// Accept loop, driven until `shutdown` resolves.
///
/// The pool is always drained before returning, even when the loop exits
/// on an accept error.
pub(crate) async fn serve(
    listener: TcpListener,
    config: Config,
    shutdown: impl Future<Output = ()>,
) -> io::Result<()> {
    tokio::pin!(shutdown);

    let pool = WorkerPool::new(config.workers);
    let mut served = 0u64;

    let result = loop {
        if config.max_clients.is_some_and(|max| served >= max) {
            break Ok(());
        }

        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => break Err(e),
            },
        };

        debug!(peer = %peer, "Connected");
        let task = async move {
            match handler::handle_connection(stream).await {
                Ok(()) => debug!(peer = %peer, "Completed"),
                Err(e) => warn!(peer = %peer, error = %e, "Connection error"),
            }
        };

        if pool.submit(task).is_err() {
            // Only possible if every worker died; nothing left to serve with
            error!("Worker pool stopped accepting tasks");
            break Ok(());
        }
        served += 1;
    };

    // Stop accepting before draining in-flight work
    drop(listener);
    match pool.shutdown(Duration::from_secs(config.grace_period)).await {
        DrainOutcome::Clean => info!("In-flight connections drained"),
        DrainOutcome::Forced { aborted } => {
            warn!(aborted, "Grace period elapsed; cancelled in-flight connections")
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerMode;
    use std::future::pending;
    use std::net::SocketAddr;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_config(max_clients: Option<u64>, workers: usize, grace_period: u64) -> Config {
        Config {
            listen: "127.0.0.1:0".to_string(),
            mode: ServerMode::Pooled,
            workers,
            grace_period,
            max_clients,
            log_level: "info".to_string(),
        }
    }

    async fn send_request(addr: SocketAddr, request: String) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_isolated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, test_config(Some(4), 4, 5), pending()));

        let clients: Vec<_> = (2..=5)
            .map(|start| tokio::spawn(send_request(addr, format!("{start}\n"))))
            .collect();

        for (start, client) in (2..=5).zip(clients) {
            let expected: Vec<String> =
                (1..=start).rev().map(|v| v.to_string()).collect();
            assert_eq!(client.await.unwrap(), format!("{}\n", expected.join("\n")));
        }

        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_error_paths_match_sequential_variant() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, test_config(Some(2), 2, 5), pending()));

        assert_eq!(
            send_request(addr, "0\n".to_string()).await,
            "ERROR: Countdown requires a positive integer\n"
        );
        assert_eq!(
            send_request(addr, "abc\n".to_string()).await,
            "ERROR: Countdown value must be an integer\n"
        );

        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_stops_accepting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, test_config(None, 2, 1), async {
            let _ = rx.await;
        }));

        // Hold one connection in-flight: the handler blocks reading a
        // request line that never arrives.
        let idle = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let start = Instant::now();
        tx.send(()).unwrap();
        server.await.unwrap().unwrap();

        // The idle connection kept a worker busy past the 1s grace period,
        // so shutdown force-cancelled it rather than waiting forever.
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(TcpStream::connect(addr).await.is_err());
        drop(idle);
    }
}
