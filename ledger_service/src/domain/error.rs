use common::Id;
use thiserror::Error;

/// The single error type every domain and use-case operation returns.
///
/// Mirrors the shape the teacher's per-aggregate error enums had
/// (`WalletError`, `TransactionError`) but collapsed into one enum, since
/// this service has a single aggregate (the wallet) rather than two
/// independently-versioned services each guarding their own error surface.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("wallet {0} not found")]
    WalletNotFound(Id),

    #[error("reference_id already in use")]
    ReferenceIdTaken,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("insufficient balance in wallet {0}")]
    InsufficientBalance(Id),

    #[error("transfer {0} is already pending against this wallet")]
    DuplicatePendingTransfer(Id),

    #[error("event has an invalid event_type")]
    InvalidEventType,

    #[error("event_type is not one this build of the service understands")]
    UnsupportedEventType,

    #[error("event version is newer than this build of the service understands")]
    UnsupportedEventVersion,

    #[error("repository error: {0}")]
    Repository(#[from] sqlx::Error),

    #[error("bus error: {0}")]
    Bus(String),

    #[error("configuration error: {0}")]
    Config(String),
}
