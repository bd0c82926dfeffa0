use super::error::LedgerError;
use async_trait::async_trait;

/// An open database transaction, threaded explicitly through use-case code.
///
/// The teacher's Go ancestor stashed its `pgx.Tx` in the request context and
/// pulled it back out inside each repository call (`pgxtx.TxWrapper`) so
/// that nested repository calls would transparently join whatever
/// transaction, if any, was already open. sqlx's `Transaction<'_, DB>` owns
/// its connection and cannot be recovered from a type-erased context the
/// same way, so here it is passed by `&mut` instead — every use case that
/// needs atomicity takes a `Tx` argument and hands `&mut tx` to each
/// repository call it makes, rather than reaching for an ambient one.
pub struct Tx(pub sqlx::Transaction<'static, sqlx::Postgres>);

/// Opens and closes the transactions use cases need to make a read-modify-
/// write sequence atomic (read projection, append event, update projection,
/// enqueue outbox row, all-or-nothing).
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Tx, LedgerError>;
    async fn commit(&self, tx: Tx) -> Result<(), LedgerError>;
    async fn rollback(&self, tx: Tx) -> Result<(), LedgerError>;
}
