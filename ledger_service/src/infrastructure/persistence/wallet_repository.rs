use async_trait::async_trait;
use common::Id;
use sqlx::PgPool;

use crate::domain::entities::Wallet;
use crate::domain::error::LedgerError;
use crate::domain::repository::WalletRepository;
use crate::domain::tx::Tx;

use super::models::WalletModel;

pub struct PostgresWalletRepository {
    pool: PgPool,
}

impl PostgresWalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WalletRepository for PostgresWalletRepository {
    async fn create(&self, tx: &mut Tx, wallet: &Wallet) -> Result<(), LedgerError> {
        let model = WalletModel::from(wallet);
        sqlx::query(
            r#"
            INSERT INTO wallets (id, reference_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(model.id)
        .bind(model.reference_id)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&mut *tx.0)
        .await
        .map_err(|err| match constraint_name(&err) {
            Some("wallets_reference_id_key") => LedgerError::ReferenceIdTaken,
            _ => LedgerError::Repository(err),
        })?;
        Ok(())
    }

    async fn get(&self, wallet_id: Id) -> Result<Wallet, LedgerError> {
        let model: WalletModel = sqlx::query_as(
            r#"SELECT id, reference_id, created_at, updated_at FROM wallets WHERE id = $1"#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::WalletNotFound(wallet_id))?;
        Ok(model.into())
    }
}

/// sqlx does not expose the violated constraint name as a typed field, so
/// this is the same substring-ish approach the teacher used, tightened to
/// go through `as_database_error`/`constraint()` instead of matching on the
/// error message text.
pub(crate) fn constraint_name(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error().and_then(|e| e.constraint())
}
