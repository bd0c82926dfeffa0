use async_trait::async_trait;
use common::Id;

use crate::domain::entities::WalletProjection;
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletProjectionRepository;
use crate::domain::tx::Tx;

use super::models::WalletProjectionModel;

pub struct PostgresWalletProjectionRepository;

impl PostgresWalletProjectionRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresWalletProjectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProjectionRepository for PostgresWalletProjectionRepository {
    async fn get(&self, tx: &mut Tx, wallet_id: Id) -> Result<WalletProjection, LedgerError> {
        let model: Option<WalletProjectionModel> = sqlx::query_as(
            r#"
            SELECT wallet_id, balance, pending_debit, pending_credit, last_event_id, created_at, updated_at
            FROM wallet_projections
            WHERE wallet_id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&mut *tx.0)
        .await?;

        Ok(model
            .map(Into::into)
            .unwrap_or_else(|| WalletProjection::empty(wallet_id)))
    }

    async fn create(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError> {
        let model = WalletProjectionModel::from(projection);
        sqlx::query(
            r#"
            INSERT INTO wallet_projections
                (wallet_id, balance, pending_debit, pending_credit, last_event_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(model.wallet_id)
        .bind(model.balance)
        .bind(model.pending_debit)
        .bind(model.pending_credit)
        .bind(model.last_event_id)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&mut *tx.0)
        .await?;
        Ok(())
    }

    async fn update(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError> {
        let model = WalletProjectionModel::from(projection);
        sqlx::query(
            r#"
            UPDATE wallet_projections SET
                balance = $2,
                pending_debit = $3,
                pending_credit = $4,
                last_event_id = $5,
                updated_at = $6
            WHERE wallet_id = $1
            "#,
        )
        .bind(model.wallet_id)
        .bind(model.balance)
        .bind(model.pending_debit)
        .bind(model.pending_credit)
        .bind(model.last_event_id)
        .bind(model.updated_at)
        .execute(&mut *tx.0)
        .await?;
        Ok(())
    }
}
