//! Rate-limited request queue
//!
//! Every read against the ledger RPC endpoint goes through one of these.
//! A single worker task drains an mpsc channel, so dispatch is strictly
//! FIFO and one-at-a-time with a minimum gap between dispatches. When an
//! operation comes back rate-limited the worker pauses the whole line for
//! a cooldown window — the failing operation's caller is answered
//! immediately, only the operations behind it wait.
//!
//! The queue retries nothing; retry policy belongs to callers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Duration, Instant};

use crate::error::SocialError;

/// Enqueued operations waiting for a dispatch slot. The channel is
/// bounded for backpressure but nothing is ever dropped; `enqueue` waits
/// for capacity.
const QUEUE_DEPTH: usize = 1024;

/// A queued operation, erased to the one bit the worker cares about:
/// whether it failed with a rate-limit signal.
type Job = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = bool> + Send>> + Send>;

pub struct RequestQueue {
    tx: mpsc::Sender<Job>,
}

impl RequestQueue {
    /// Spawn the worker and hand back the shared queue.
    ///
    /// Must be called from within a tokio runtime; the queue lives for
    /// the rest of the process.
    pub fn start(gap_ms: u64, cooldown_ms: u64) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(run_worker(
            rx,
            Duration::from_millis(gap_ms),
            Duration::from_millis(cooldown_ms),
        ));
        Arc::new(Self { tx })
    }

    /// Run `operation` when its turn comes and return its result.
    ///
    /// The operation's own error is returned as-is; `QueueClosed` only
    /// appears if the worker is gone, which a healthy process never sees.
    pub async fn enqueue<T, F, Fut>(&self, operation: F) -> Result<T, SocialError>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, SocialError>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let job: Job = Box::new(move || {
            Box::pin(async move {
                let result = operation().await;
                let rate_limited = matches!(&result, Err(e) if e.is_rate_limited());
                // Receiver may have been dropped; the dispatch slot was
                // still consumed either way.
                let _ = done_tx.send(result);
                rate_limited
            })
        });

        self.tx
            .send(job)
            .await
            .map_err(|_| SocialError::QueueClosed)?;
        done_rx.await.map_err(|_| SocialError::QueueClosed)?
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Job>, gap: Duration, cooldown: Duration) {
    log::debug!("request queue worker started (gap {:?})", gap);
    let mut last_dispatch: Option<Instant> = None;

    while let Some(job) = rx.recv().await {
        if let Some(at) = last_dispatch {
            let since = at.elapsed();
            if since < gap {
                sleep(gap - since).await;
            }
        }
        last_dispatch = Some(Instant::now());

        let rate_limited = job().await;

        if rate_limited {
            log::warn!("⏳ RPC rate limited, pausing dispatch for {:?}", cooldown);
            sleep(cooldown).await;
        }
    }

    log::debug!("request queue worker stopped");
}
