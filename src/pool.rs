//! Bounded worker pool with graceful drain.
//!
//! A fixed number of long-lived worker tasks pull jobs off a shared,
//! unbounded queue, so submission never blocks the caller while
//! execution concurrency stays capped at the pool size.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::trace;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed-capacity pool of worker tasks.
pub struct WorkerPool {
    queue: Option<mpsc::UnboundedSender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

/// How a pool shutdown completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// All workers finished within the grace period.
    Clean,
    /// The grace period elapsed; remaining workers were cancelled.
    Forced { aborted: usize },
}

/// Error returned when submitting to a pool that is no longer running.
#[derive(Debug)]
pub struct PoolClosed;

impl fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker pool is shut down")
    }
}

impl std::error::Error for PoolClosed {}

impl WorkerPool {
    /// Spawn a pool with `size` workers.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "worker pool requires at least one worker");

        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..size)
            .map(|id| {
                let queue = Arc::clone(&rx);
                tokio::spawn(worker_loop(id, queue))
            })
            .collect();

        WorkerPool {
            queue: Some(tx),
            workers,
        }
    }

    /// Enqueue a task for execution by the next free worker.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolClosed>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.queue {
            Some(tx) => tx.send(Box::pin(task)).map_err(|_| PoolClosed),
            None => Err(PoolClosed),
        }
    }

    /// Shut the pool down, waiting up to `grace` for workers to drain.
    ///
    /// Closing the queue lets each worker finish its current job and any
    /// already-queued work, then exit. Workers still running when the
    /// grace deadline passes are aborted.
    pub async fn shutdown(mut self, grace: Duration) -> DrainOutcome {
        self.queue.take();

        let deadline = tokio::time::Instant::now() + grace;
        let mut aborted = 0;
        for mut worker in self.workers.drain(..) {
            let drained = tokio::time::timeout_at(deadline, &mut worker).await;
            if drained.is_err() {
                worker.abort();
                aborted += 1;
            }
        }

        if aborted == 0 {
            DrainOutcome::Clean
        } else {
            DrainOutcome::Forced { aborted }
        }
    }
}

async fn worker_loop(id: usize, queue: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>) {
    loop {
        // The guard is released before the job runs, so other workers can
        // pull from the queue while this one is busy.
        let job = queue.lock().await.recv().await;
        match job {
            Some(job) => job.await,
            None => break,
        }
    }
    trace!(worker = id, "Worker exiting");
}
