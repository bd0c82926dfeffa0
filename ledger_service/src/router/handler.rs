use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::bus::BusMessage;
use crate::domain::entities::WalletEvent;
use crate::domain::error::LedgerError;
use crate::use_cases::RebuildProjectionUseCase;

/// A unit of subscribed work: a name (for logging), the subject it wants
/// delivered, and the handling itself. Mirrors the Go ancestor's
/// `Handler[Event]` interface, minus the generic event type parameter —
/// here there is exactly one kind of message on the bus.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;
    fn subject(&self) -> &str;
    async fn handle(&self, message: BusMessage) -> Result<(), LedgerError>;
}

/// The one handler this service registers: on `wallet_events.created`,
/// decode the event enough to learn which wallet it belongs to and ask the
/// rebuilder to fold anything new into that wallet's projection.
///
/// This is deliberately not "apply this one event" — the rebuilder always
/// replays from `last_event_id` forward, so a handler invoked twice for
/// the same message, or invoked after missing a message entirely, ends up
/// in the same place either way.
pub struct WalletEventCreatedHandler {
    rebuild: Arc<RebuildProjectionUseCase>,
}

impl WalletEventCreatedHandler {
    pub const SUBJECT: &'static str = "wallet_events.created";

    pub fn new(rebuild: Arc<RebuildProjectionUseCase>) -> Self {
        Self { rebuild }
    }
}

#[async_trait]
impl Handler for WalletEventCreatedHandler {
    fn name(&self) -> &str {
        "wallet_event_created_handler"
    }

    fn subject(&self) -> &str {
        Self::SUBJECT
    }

    async fn handle(&self, message: BusMessage) -> Result<(), LedgerError> {
        let event: WalletEvent = serde_json::from_slice(&message.payload)
            .map_err(|err| LedgerError::InvalidData(format!("malformed wallet event on bus: {err}")))?;
        self.rebuild.execute(event.wallet_id, event.id).await?;
        Ok(())
    }
}
