pub mod handler;
pub mod middleware;
pub mod router;

pub use handler::{Handler, WalletEventCreatedHandler};
pub use router::Router;
