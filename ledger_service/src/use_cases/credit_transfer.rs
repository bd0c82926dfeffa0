use std::sync::Arc;

use chrono::Utc;
use common::{Id, Money};

use crate::domain::entities::{EventType, TransferStatus, WalletEvent, WALLET_EVENT_VERSION_ONE};
use crate::domain::error::LedgerError;
use crate::domain::reducer::reduce;
use crate::domain::repository::{WalletEventRepository, WalletRepository};

use super::append_event::EventAppender;

/// Starts a transfer that moves funds out of a wallet (spec.md §4.1: a
/// credit is money leaving). Unlike a debit, a credit can violate the
/// "balance never goes negative via this path" invariant, so this command
/// replays the full event log through the reducer before appending
/// anything — the only command handler in the service that pays that
/// O(log size) cost.
pub struct CreditTransferUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    event_repo: Arc<dyn WalletEventRepository>,
    appender: EventAppender,
}

impl CreditTransferUseCase {
    pub fn new(
        wallet_repo: Arc<dyn WalletRepository>,
        event_repo: Arc<dyn WalletEventRepository>,
        appender: EventAppender,
    ) -> Self {
        Self {
            wallet_repo,
            event_repo,
            appender,
        }
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
        self.wallet_repo.get(wallet_id).await?;

        let history = self.event_repo.list_by_wallet_id(wallet_id).await?;
        let projection = reduce(wallet_id, &history)?;
        if projection.balance < amount {
            return Err(LedgerError::InsufficientBalance(wallet_id));
        }

        let event = WalletEvent {
            id: Id::new(),
            wallet_id,
            transfer_id,
            reference_id,
            version: WALLET_EVENT_VERSION_ONE,
            event_type: EventType::CreditTransfer,
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
    use crate::use_cases::test_support::{empty_appender, MockWalletEventRepositoryImpl, MockWalletRepositoryImpl};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn rejects_a_negative_amount_before_touching_storage() {
        let wallet_repo = MockWalletRepositoryImpl::new();
        let event_repo = MockWalletEventRepositoryImpl::new();
        let use_case = CreditTransferUseCase::new(Arc::new(wallet_repo), Arc::new(event_repo), empty_appender());

        let err = use_case
            .execute(
                Id::new(),
                Id::new(),
                "ref".to_string(),
                dec!(-5),
                TransferStatus::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NegativeAmount));
    }

    /// S5: a credit that would overdraw the wallet is rejected before any
    /// event is written.
    #[tokio::test]
    async fn rejects_a_credit_that_would_overdraw_the_wallet() {
        let wallet_id = Id::new();
        let mut wallet_repo = MockWalletRepositoryImpl::new();
        wallet_repo
            .expect_get()
            .withf(move |id| *id == wallet_id)
            .returning(|_| {
                Ok(crate::domain::entities::Wallet::reconstitute(
                    Id::new(),
                    "ref".to_string(),
                    chrono::Utc::now(),
                    chrono::Utc::now(),
                ))
            });

        let mut event_repo = MockWalletEventRepositoryImpl::new();
        event_repo
            .expect_list_by_wallet_id()
            .withf(move |id| *id == wallet_id)
            .returning(|_| Ok(Vec::new()));

        let use_case = CreditTransferUseCase::new(Arc::new(wallet_repo), Arc::new(event_repo), empty_appender());
        let err = use_case
            .execute(
                wallet_id,
                Id::new(),
                "ref".to_string(),
                dec!(50),
                TransferStatus::Pending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance(id) if id == wallet_id));
    }
}
