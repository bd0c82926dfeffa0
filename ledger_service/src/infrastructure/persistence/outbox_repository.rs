use async_trait::async_trait;
use common::Id;

use crate::domain::entities::OutboxMessage;
use crate::domain::error::LedgerError;
use crate::domain::repository::OutboxRepository;
use crate::domain::tx::Tx;

use super::models::OutboxMessageModel;

pub struct PostgresOutboxRepository;

impl PostgresOutboxRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresOutboxRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutboxRepository for PostgresOutboxRepository {
    async fn enqueue(&self, tx: &mut Tx, message: &OutboxMessage) -> Result<(), LedgerError> {
        let model = OutboxMessageModel::from(message);
        sqlx::query(
            r#"
            INSERT INTO outbox_messages (id, publisher_type, payload, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(model.id)
        .bind(model.publisher_type)
        .bind(model.payload)
        .bind(model.status)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&mut *tx.0)
        .await?;
        Ok(())
    }

    /// Locks up to `limit` queued rows for `publisher_type`, skipping any
    /// row another poller already has locked, rather than blocking on it.
    /// The caller is expected to publish each row and call
    /// `mark_published` before committing `tx` — holding the lock for the
    /// duration of the publish call is what prevents two pollers from ever
    /// delivering the same message.
    async fn lock_queued_batch(
        &self,
        tx: &mut Tx,
        publisher_type: &str,
        limit: i64,
    ) -> Result<Vec<OutboxMessage>, LedgerError> {
        let models: Vec<OutboxMessageModel> = sqlx::query_as(
            r#"
            SELECT id, publisher_type, payload, status, created_at, updated_at
            FROM outbox_messages
            WHERE publisher_type = $1 AND status = 'queued'
            ORDER BY id ASC
            LIMIT $2
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(publisher_type)
        .bind(limit)
        .fetch_all(&mut *tx.0)
        .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_published(&self, tx: &mut Tx, id: Id) -> Result<(), LedgerError> {
        sqlx::query(r#"UPDATE outbox_messages SET status = 'published', updated_at = now() WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx.0)
            .await?;
        Ok(())
    }
}
