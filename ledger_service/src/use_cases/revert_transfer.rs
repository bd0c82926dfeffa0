use common::Id;

use crate::domain::entities::{TransferStatus, WalletEvent};
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletRepository;

use super::append_event::EventAppender;
use std::sync::Arc;

/// Settles a pending transfer as failed. For a debit this refunds the
/// balance; for a credit the funds were never added, so this just clears
/// it from the pending side. Same no-pre-check contract as
/// [`super::complete_transfer::CompleteTransferUseCase`].
pub struct RevertTransferUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    appender: EventAppender,
}

impl RevertTransferUseCase {
    pub fn new(wallet_repo: Arc<dyn WalletRepository>, appender: EventAppender) -> Self {
        Self { wallet_repo, appender }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(
        &self,
        wallet_id: Id,
        transfer_id: Id,
        reference_id: String,
    ) -> Result<WalletEvent, LedgerError> {
        self.wallet_repo.get(wallet_id).await?;
        self.appender
            .append_status_update(wallet_id, transfer_id, reference_id, TransferStatus::Failed)
            .await
    }
}
