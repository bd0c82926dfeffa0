pub mod models;
pub mod outbox_repository;
pub mod transaction_manager;
pub mod wallet_event_repository;
pub mod wallet_projection_repository;
pub mod wallet_repository;

pub use outbox_repository::PostgresOutboxRepository;
pub use transaction_manager::PgTransactionManager;
pub use wallet_event_repository::PostgresWalletEventRepository;
pub use wallet_projection_repository::PostgresWalletProjectionRepository;
pub use wallet_repository::PostgresWalletRepository;
