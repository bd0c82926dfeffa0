use std::sync::Arc;

use common::Id;

use crate::domain::entities::{Wallet, WalletProjection};
use crate::domain::error::LedgerError;
use crate::domain::repository::{WalletProjectionRepository, WalletRepository};
use crate::domain::tx::TransactionManager;

/// Creates a wallet and its zero-valued projection row in the same
/// transaction, watermarked with the wallet's own id as the
/// `last_event_id` sentinel (spec.md §3 LIFECYCLE). Uniqueness of
/// `reference_id` is enforced by the database; this use case just
/// translates the resulting constraint violation into a domain error.
pub struct CreateWalletUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    projection_repo: Arc<dyn WalletProjectionRepository>,
    tx_manager: Arc<dyn TransactionManager>,
}

impl CreateWalletUseCase {
    pub fn new(
        wallet_repo: Arc<dyn WalletRepository>,
        projection_repo: Arc<dyn WalletProjectionRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            wallet_repo,
            projection_repo,
            tx_manager,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, wallet_id: Id, reference_id: String) -> Result<Wallet, LedgerError> {
        let wallet = Wallet::new(wallet_id, reference_id)?;
        let mut tx = self.tx_manager.begin().await?;

        let outcome = async {
            self.wallet_repo.create(&mut tx, &wallet).await?;
            let projection = WalletProjection::empty(wallet.id());
            self.projection_repo.create(&mut tx, &projection).await?;
            Ok(())
        }
        .await;

        match outcome {
            Ok(()) => {
                self.tx_manager.commit(tx).await?;
                Ok(wallet)
            }
            Err(err) => {
                let _ = self.tx_manager.rollback(tx).await;
                Err(err)
            }
        }
    }
}
