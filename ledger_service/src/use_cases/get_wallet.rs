use std::sync::Arc;

use common::Id;

use crate::domain::entities::{Wallet, WalletProjection};
use crate::domain::error::LedgerError;
use crate::domain::repository::{WalletProjectionRepository, WalletRepository};
use crate::domain::tx::TransactionManager;

/// Reads a wallet and its current cached balance together. The projection
/// is read inside its own (read-only) transaction purely so it goes
/// through the same `Tx`-based repository methods everything else does —
/// there is nothing here that needs to be atomic with the wallet lookup.
pub struct GetWalletUseCase {
    wallet_repo: Arc<dyn WalletRepository>,
    projection_repo: Arc<dyn WalletProjectionRepository>,
    tx_manager: Arc<dyn TransactionManager>,
}

impl GetWalletUseCase {
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
    pub async fn execute(&self, wallet_id: Id) -> Result<(Wallet, WalletProjection), LedgerError> {
        let wallet = self.wallet_repo.get(wallet_id).await?;

        let mut tx = self.tx_manager.begin().await?;
        let projection = match self.projection_repo.get(&mut tx, wallet_id).await {
            Ok(projection) => projection,
            Err(err) => {
                let _ = self.tx_manager.rollback(tx).await;
                return Err(err);
            }
        };
        self.tx_manager.rollback(tx).await?;

        Ok((wallet, projection))
    }
}
