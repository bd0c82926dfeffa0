use std::sync::Arc;

use chrono::Utc;
use common::{Id, Money};

use crate::domain::entities::{EventType, TransferStatus, WalletEvent, WALLET_EVENT_VERSION_ONE};
use crate::domain::error::LedgerError;
use crate::domain::repository::{OutboxRepository, WalletEventRepository};
use crate::domain::tx::{Tx, TransactionManager};
use crate::domain::OutboxMessage;

/// The write path every command (`DebitTransfer`, `CreditTransfer`,
/// `CompleteTransfer`, `RevertTransfer`) funnels through: persist the
/// event and enqueue the outbox row that will eventually tell the rest of
/// the system about it, both inside one transaction so a crash between
/// the two leaves nothing half-written.
///
/// This deliberately does **not** touch the projection table. Per
/// spec.md §4.4, the projection is updated only by the rebuilder
/// (`rebuild_projection`), asynchronously, after the outbox poller and
/// bus have handed the event off — every command path here is therefore
/// O(1) beyond whatever the caller already did to validate the command
/// (e.g. the credit balance pre-check).
#[derive(Clone)]
pub struct EventAppender {
    pub event_repo: Arc<dyn WalletEventRepository>,
    pub outbox_repo: Arc<dyn OutboxRepository>,
    pub tx_manager: Arc<dyn TransactionManager>,
}

/// The outbox `publisher_type` every wallet event is queued under. The
/// concrete NATS adapter's poller drains rows tagged with this value.
pub const JETSTREAM_PUBLISHER_TYPE: &str = "jetstream";

impl EventAppender {
    pub async fn append(&self, event: WalletEvent) -> Result<WalletEvent, LedgerError> {
        let mut tx = self.tx_manager.begin().await?;
        match self.append_in(&mut tx, &event).await {
            Ok(()) => {
                self.tx_manager.commit(tx).await?;
                Ok(event)
            }
            Err(err) => {
                let _ = self.tx_manager.rollback(tx).await;
                Err(err)
            }
        }
    }

    /// Appends an `UpdateTransferStatus` event resolving `transfer_id` to a
    /// terminal status. Per spec.md §4.4, this never pre-checks whether the
    /// transfer is actually pending — an update for an unknown or already
    /// -settled transfer is still persisted and shipped; it is the
    /// reducer, downstream, that treats it as a no-op (spec.md §8 S8).
    pub async fn append_status_update(
        &self,
        wallet_id: Id,
        transfer_id: Id,
        reference_id: String,
        status: TransferStatus,
    ) -> Result<WalletEvent, LedgerError> {
        let event = WalletEvent {
            id: Id::new(),
            wallet_id,
            transfer_id,
            reference_id,
            version: WALLET_EVENT_VERSION_ONE,
            event_type: EventType::UpdateTransferStatus,
            status,
            amount: Money::ZERO,
            created_at: Utc::now(),
        };
        self.append(event).await
    }

    async fn append_in(&self, tx: &mut Tx, event: &WalletEvent) -> Result<(), LedgerError> {
        self.event_repo.create(tx, event).await?;

        let payload = serde_json::to_value(event)
            .map_err(|err| LedgerError::InvalidData(format!("failed to serialize event: {err}")))?;
        let outbox_message = OutboxMessage::new(JETSTREAM_PUBLISHER_TYPE, payload);
        self.outbox_repo.enqueue(tx, &outbox_message).await?;

        Ok(())
    }
}
