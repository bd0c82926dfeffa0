use super::entities::{OutboxMessage, Wallet, WalletEvent, WalletProjection};
use super::error::LedgerError;
use super::tx::Tx;
use async_trait::async_trait;
use common::Id;

/// Storage port for the `wallets` aggregate root. Reads are served straight
/// off the pool; the single write (`create`) takes part in whatever
/// transaction the calling use case already opened.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn create(&self, tx: &mut Tx, wallet: &Wallet) -> Result<(), LedgerError>;
    async fn get(&self, wallet_id: Id) -> Result<Wallet, LedgerError>;
}

/// Storage port for the append-only event log. `list_by_wallet_id` always
/// returns events ordered by `id` ascending — the reducer and the
/// projection rebuilder both depend on that ordering, not on any
/// insertion-order or sequence-column guarantee.
#[async_trait]
pub trait WalletEventRepository: Send + Sync {
    async fn create(&self, tx: &mut Tx, event: &WalletEvent) -> Result<(), LedgerError>;
    async fn list_by_wallet_id(&self, wallet_id: Id) -> Result<Vec<WalletEvent>, LedgerError>;
}

/// Storage port for the cached projection row. `get` returns the empty
/// projection (never an error) for a wallet that has no row yet, so the
/// first event applied to a wallet has exactly the same code path as the
/// hundredth.
#[async_trait]
pub trait WalletProjectionRepository: Send + Sync {
    async fn get(&self, tx: &mut Tx, wallet_id: Id) -> Result<WalletProjection, LedgerError>;
    async fn create(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError>;
    async fn update(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError>;
}

/// Storage port for the transactional outbox. `lock_queued_batch` takes the
/// row lock (`FOR UPDATE SKIP LOCKED`) inside the caller's transaction so
/// concurrent pollers never hand the same row to two publishers at once.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn enqueue(&self, tx: &mut Tx, message: &OutboxMessage) -> Result<(), LedgerError>;
    async fn lock_queued_batch(
        &self,
        tx: &mut Tx,
        publisher_type: &str,
        limit: i64,
    ) -> Result<Vec<OutboxMessage>, LedgerError>;
    async fn mark_published(&self, tx: &mut Tx, id: Id) -> Result<(), LedgerError>;
}
