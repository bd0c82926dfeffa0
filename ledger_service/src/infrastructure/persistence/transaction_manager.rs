use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::error::LedgerError;
use crate::domain::tx::{Tx, TransactionManager};

/// The only concrete implementation of [`TransactionManager`] this service
/// ships — a thin wrapper over `PgPool::begin`/`commit`/`rollback`.
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<Tx, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(Tx(tx))
    }

    async fn commit(&self, tx: Tx) -> Result<(), LedgerError> {
        tx.0.commit().await?;
        Ok(())
    }

    async fn rollback(&self, tx: Tx) -> Result<(), LedgerError> {
        tx.0.rollback().await?;
        Ok(())
    }
}
