use std::sync::Arc;

use chrono::Utc;
use common::{Id, Money};

use crate::domain::entities::{EventType, TransferStatus, WalletEvent, WALLET_EVENT_VERSION_ONE};
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletRepository;

use super::append_event::EventAppender;

/// Starts a transfer that moves funds into a wallet (spec.md §4.1: a debit
/// is money entering). No pre-read of the event log is needed — a debit
/// can only ever increase the balance once settled, so there is no lower
/// bound it could violate — which keeps this command's cost O(1)
/// regardless of how long the wallet's history is.
pub struct DebitTransferUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    appender: EventAppender,
}

impl DebitTransferUseCase {
    pub fn new(wallet_repo: Arc<dyn WalletRepository>, appender: EventAppender) -> Self {
        Self { wallet_repo, appender }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(
        &self,
        wallet_id: Id,
        transfer_id: Id,
        reference_id: String,
        amount: Money,
        status: TransferStatus,
    ) -> Result<WalletEvent, LedgerError> {
        if amount < Money::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        // Confirms the wallet exists before a doomed event is appended —
        // the foreign key would catch it anyway, but this gives callers
        // `WalletNotFound` instead of an opaque repository error.
        self.wallet_repo.get(wallet_id).await?;

        let event = WalletEvent {
            id: Id::new(),
            wallet_id,
            transfer_id,
            reference_id,
            version: WALLET_EVENT_VERSION_ONE,
            event_type: EventType::DebitTransfer,
            status,
            amount,
            created_at: Utc::now(),
        };
        self.appender.append(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{empty_appender, MockWalletRepositoryImpl};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn rejects_a_negative_amount_before_touching_storage() {
        let wallet_repo = MockWalletRepositoryImpl::new();
        let use_case = DebitTransferUseCase::new(Arc::new(wallet_repo), empty_appender());

        let err = use_case
            .execute(
                Id::new(),
                Id::new(),
                "ref".to_string(),
                dec!(-1),
                TransferStatus::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NegativeAmount));
    }

    #[tokio::test]
    async fn surfaces_wallet_not_found_without_appending_an_event() {
        let wallet_id = Id::new();
        let mut wallet_repo = MockWalletRepositoryImpl::new();
        wallet_repo
            .expect_get()
            .withf(move |id| *id == wallet_id)
            .returning(move |_| Err(LedgerError::WalletNotFound(wallet_id)));

        let use_case = DebitTransferUseCase::new(Arc::new(wallet_repo), empty_appender());
        let err = use_case
            .execute(
                wallet_id,
                Id::new(),
                "ref".to_string(),
                dec!(10),
                TransferStatus::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WalletNotFound(id) if id == wallet_id));
    }
}
