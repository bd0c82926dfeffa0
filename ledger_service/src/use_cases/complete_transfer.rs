use common::Id;

use crate::domain::entities::{TransferStatus, WalletEvent};
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletRepository;

use super::append_event::EventAppender;
use std::sync::Arc;

/// Settles a pending transfer as completed. For a credit this is what
/// actually moves the funds in (or out, depending on direction); for a
/// debit the funds already moved at creation, so this just clears it from
/// the pending side. Per spec.md §4.4, this never checks whether
/// `transfer_id` is actually pending — the event is always appended, and
/// the reducer discards an update for an unknown or already-settled
/// transfer as a no-op (spec.md §8 S8).
pub struct CompleteTransferUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    appender: EventAppender,
}

impl CompleteTransferUseCase {
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
            .append_status_update(wallet_id, transfer_id, reference_id, TransferStatus::Completed)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::MockWalletRepositoryImpl;
    use crate::use_cases::test_support::{MockOutboxRepositoryImpl, MockTransactionManagerImpl, MockWalletEventRepositoryImpl};
    use crate::use_cases::append_event::EventAppender;

    #[tokio::test]
    async fn surfaces_wallet_not_found_without_appending_an_event() {
        let wallet_id = Id::new();
        let mut wallet_repo = MockWalletRepositoryImpl::new();
        wallet_repo
            .expect_get()
            .withf(move |id| *id == wallet_id)
            .returning(move |_| Err(LedgerError::WalletNotFound(wallet_id)));

        let appender = EventAppender {
            event_repo: Arc::new(MockWalletEventRepositoryImpl::new()),
            outbox_repo: Arc::new(MockOutboxRepositoryImpl::new()),
            tx_manager: Arc::new(MockTransactionManagerImpl::new()),
        };
        let use_case = CompleteTransferUseCase::new(Arc::new(wallet_repo), appender);

        let err = use_case
            .execute(wallet_id, Id::new(), "ref".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WalletNotFound(id) if id == wallet_id));
    }
}
