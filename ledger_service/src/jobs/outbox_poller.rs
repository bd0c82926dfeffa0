use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::bus::{BusMessage, Publisher};
use crate::domain::error::LedgerError;
use crate::domain::repository::OutboxRepository;
use crate::domain::tx::TransactionManager;
use crate::router::WalletEventCreatedHandler;
use crate::use_cases::append_event::JETSTREAM_PUBLISHER_TYPE;

/// Drains the transactional outbox on a fixed tick, same shape as the Go
/// ancestor's outbox worker: lock a batch with `FOR UPDATE SKIP LOCKED`,
/// publish each row, mark it published, commit. Each row is published
/// independently — one row failing to publish only leaves that row
/// `queued` for a later tick, it never holds up the rest of the locked
/// batch. Publication is therefore at-least-once, which is exactly what
/// the idempotent projection rebuilder on the other end of the bus is
/// built to tolerate.
pub struct OutboxPoller {
    outbox_repo: Arc<dyn OutboxRepository>,
    tx_manager: Arc<dyn TransactionManager>,
    publisher: Arc<dyn Publisher>,
    poll_interval: Duration,
    batch_size: i64,
}

impl OutboxPoller {
    pub fn new(
        outbox_repo: Arc<dyn OutboxRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        publisher: Arc<dyn Publisher>,
        poll_interval: Duration,
        batch_size: i64,
    ) -> Self {
        Self {
            outbox_repo,
            tx_manager,
            publisher,
            poll_interval,
            batch_size,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("outbox poller shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.drain_once().await {
                        error!(error = %err, "outbox poller tick failed");
                    }
                }
            }
        }
    }

    async fn drain_once(&self) -> Result<(), LedgerError> {
        let mut tx = self.tx_manager.begin().await?;
        let batch = self
            .outbox_repo
            .lock_queued_batch(&mut tx, JETSTREAM_PUBLISHER_TYPE, self.batch_size)
            .await?;

        if batch.is_empty() {
            self.tx_manager.rollback(tx).await?;
            return Ok(());
        }

        // A publish failure is per-message: it is logged and the row is left
        // `queued` for a future tick, but it never aborts the rest of the
        // batch. Each row is published and (on success) marked independently
        // inside the one transaction holding the `FOR UPDATE SKIP LOCKED`
        // lock; only the commit at the end is all-or-nothing, and nothing
        // here ever rolls it back on a publish error.
        let batch_len = batch.len();
        let mut published = 0usize;
        for message in &batch {
            match self
                .publisher
                .publish(BusMessage::outbound(
                    WalletEventCreatedHandler::SUBJECT,
                    serde_json::to_vec(&message.payload).unwrap_or_default(),
                ))
                .await
            {
                Ok(()) => {
                    self.outbox_repo.mark_published(&mut tx, message.id).await?;
                    published += 1;
                }
                Err(err) => {
                    warn!(outbox_id = %message.id, error = %err, "failed to publish outbox message, will retry next tick");
                }
            }
        }

        self.tx_manager.commit(tx).await?;
        info!(published, batch_len, "drained outbox batch");
        Ok(())
    }
}
