use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::bus::{BusMessage, Subscriber};
use crate::domain::error::LedgerError;

use super::handler::Handler;
use super::middleware::dispatch;

/// Subscribes a [`Handler`] to its subject and fans deliveries out across a
/// small worker pool, same shape as the Go ancestor's `router.Router`: one
/// subscription per handler, a bounded queue in front of the workers so a
/// slow handler applies backpressure instead of buffering without limit,
/// and cooperative shutdown via a [`CancellationToken`] rather than an
/// abort.
pub struct Router {
    subscriber: Arc<dyn Subscriber>,
    concurrency: usize,
}

impl Router {
    pub fn new(subscriber: Arc<dyn Subscriber>, concurrency: usize) -> Self {
        Self {
            subscriber,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs until `cancel` fires, then drains whatever is already queued
    /// before returning — a message handed to a worker is always finished,
    /// never dropped mid-handling.
    pub async fn run(&self, handler: Arc<dyn Handler>, cancel: CancellationToken) -> Result<(), LedgerError> {
        let mut inbound = self.subscriber.subscribe(handler.subject()).await?;
        let (work_tx, work_rx) = mpsc::channel::<BusMessage>(1);
        let work_rx = Arc::new(Mutex::new(work_rx));

        let mut workers = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            let handler = handler.clone();
            let work_rx = work_rx.clone();
            workers.push(tokio::spawn(async move {
                loop {
                    let message = work_rx.lock().await.recv().await;
                    let Some(message) = message else {
                        break;
                    };
                    if let Err(err) = dispatch(handler.clone(), message).await {
                        warn!(worker = worker_id, handler = handler.name(), error = %err, "message handling failed");
                    }
                }
            }));
        }

        info!(handler = handler.name(), subject = handler.subject(), concurrency = self.concurrency, "router worker pool started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(handler = handler.name(), "shutdown requested, draining in-flight work");
                    break;
                }
                message = inbound.recv() => {
                    match message {
                        Some(message) => {
                            if work_tx.send(message).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            info!(handler = handler.name(), "subscription closed");
                            break;
                        }
                    }
                }
            }
        }

        drop(work_tx);
        for worker in workers {
            let _ = worker.await;
        }
        info!(handler = handler.name(), "router worker pool stopped");
        Ok(())
    }
}
