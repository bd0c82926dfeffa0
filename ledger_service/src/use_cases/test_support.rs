//! Shared mock scaffolding for use-case unit tests. Each mock here is a
//! manual `mock!` block rather than `#[automock]` — the ports are plain
//! traits with no generic methods, so there is nothing automock buys that
//! writing the block out once, here, does not.

use async_trait::async_trait;
use common::Id;
use mockall::mock;
use std::sync::Arc;

use crate::domain::entities::{OutboxMessage, Wallet, WalletEvent, WalletProjection};
use crate::domain::error::LedgerError;
use crate::domain::repository::{OutboxRepository, WalletEventRepository, WalletProjectionRepository, WalletRepository};
use crate::domain::tx::{Tx, TransactionManager};
use crate::use_cases::append_event::EventAppender;

mock! {
    pub WalletRepositoryImpl {}

    #[async_trait]
    impl WalletRepository for WalletRepositoryImpl {
        async fn create(&self, tx: &mut Tx, wallet: &Wallet) -> Result<(), LedgerError>;
        async fn get(&self, wallet_id: Id) -> Result<Wallet, LedgerError>;
    }
}

mock! {
    pub WalletEventRepositoryImpl {}

    #[async_trait]
    impl WalletEventRepository for WalletEventRepositoryImpl {
        async fn create(&self, tx: &mut Tx, event: &WalletEvent) -> Result<(), LedgerError>;
        async fn list_by_wallet_id(&self, wallet_id: Id) -> Result<Vec<WalletEvent>, LedgerError>;
    }
}

mock! {
    pub WalletProjectionRepositoryImpl {}

    #[async_trait]
    impl WalletProjectionRepository for WalletProjectionRepositoryImpl {
        async fn get(&self, tx: &mut Tx, wallet_id: Id) -> Result<WalletProjection, LedgerError>;
        async fn create(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError>;
        async fn update(&self, tx: &mut Tx, projection: &WalletProjection) -> Result<(), LedgerError>;
    }
}

mock! {
    pub OutboxRepositoryImpl {}

    #[async_trait]
    impl OutboxRepository for OutboxRepositoryImpl {
        async fn enqueue(&self, tx: &mut Tx, message: &OutboxMessage) -> Result<(), LedgerError>;
        async fn lock_queued_batch(
            &self,
            tx: &mut Tx,
            publisher_type: &str,
            limit: i64,
        ) -> Result<Vec<OutboxMessage>, LedgerError>;
        async fn mark_published(&self, tx: &mut Tx, id: Id) -> Result<(), LedgerError>;
    }
}

mock! {
    pub TransactionManagerImpl {}

    #[async_trait]
    impl TransactionManager for TransactionManagerImpl {
        async fn begin(&self) -> Result<Tx, LedgerError>;
        async fn commit(&self, tx: Tx) -> Result<(), LedgerError>;
        async fn rollback(&self, tx: Tx) -> Result<(), LedgerError>;
    }
}

/// An `EventAppender` wired to mocks with no expectations set. Safe to pass
/// into a use case whose test exercises only a validation path that
/// returns before the appender is ever called.
pub fn empty_appender() -> EventAppender {
    EventAppender {
        event_repo: Arc::new(MockWalletEventRepositoryImpl::new()),
        outbox_repo: Arc::new(MockOutboxRepositoryImpl::new()),
        tx_manager: Arc::new(MockTransactionManagerImpl::new()),
    }
}
