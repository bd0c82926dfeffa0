pub mod append_event;
pub mod complete_transfer;
pub mod create_wallet;
pub mod credit_transfer;
pub mod debit_transfer;
pub mod get_wallet;
pub mod rebuild_projection;
pub mod revert_transfer;

#[cfg(test)]
pub mod test_support;

pub use append_event::EventAppender;
pub use complete_transfer::CompleteTransferUseCase;
pub use create_wallet::CreateWalletUseCase;
pub use credit_transfer::CreditTransferUseCase;
pub use debit_transfer::DebitTransferUseCase;
pub use get_wallet::GetWalletUseCase;
pub use rebuild_projection::RebuildProjectionUseCase;
pub use revert_transfer::RevertTransferUseCase;
