use async_trait::async_trait;
use common::Id;
use sqlx::PgPool;

use crate::domain::entities::WalletEvent;
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletEventRepository;
use crate::domain::tx::Tx;

use super::models::WalletEventModel;
use super::wallet_repository::constraint_name;

pub struct PostgresWalletEventRepository {
    pool: PgPool,
}

impl PostgresWalletEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletEventRepository for PostgresWalletEventRepository {
    async fn create(&self, tx: &mut Tx, event: &WalletEvent) -> Result<(), LedgerError> {
        let model = WalletEventModel::from(event);
        sqlx::query(
            r#"
            INSERT INTO wallet_events
                (id, wallet_id, transfer_id, reference_id, version, event_type, status, amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(model.id)
        .bind(model.wallet_id)
        .bind(model.transfer_id)
        .bind(model.reference_id)
        .bind(model.version)
        .bind(model.event_type)
        .bind(model.status)
        .bind(model.amount)
        .bind(model.created_at)
        .execute(&mut *tx.0)
        .await
        .map_err(|err| match constraint_name(&err) {
            Some("wallet_events_wallet_id_transfer_id_event_type_key") => {
                LedgerError::DuplicatePendingTransfer(event.transfer_id)
            }
            _ => LedgerError::Repository(err),
        })?;
        Ok(())
    }

    async fn list_by_wallet_id(&self, wallet_id: Id) -> Result<Vec<WalletEvent>, LedgerError> {
        let models: Vec<WalletEventModel> = sqlx::query_as(
            r#"
            SELECT id, wallet_id, transfer_id, reference_id, version, event_type, status, amount, created_at
            FROM wallet_events
            WHERE wallet_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
