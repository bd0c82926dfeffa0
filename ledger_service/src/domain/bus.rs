use super::error::LedgerError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Acknowledgment handle for one delivered [`BusMessage`]. The router's
/// middleware (spec.md §4.6) drives this automatically: `ack` once the
/// handler returns `Ok`, `nack` if it errors or panics, so a failed
/// rebuild is redelivered instead of silently lost.
#[async_trait]
pub trait Ack: Send + Sync {
    async fn ack(&self);
    async fn nack(&self);
}

/// The ack target for a message that was never pulled off a redelivering
/// transport in the first place — the publish side of the bus, and the
/// in-memory fake, which has no broker to ask for a redelivery anyway.
pub struct NoopAck;

#[async_trait]
impl Ack for NoopAck {
    async fn ack(&self) {}
    async fn nack(&self) {}
}

/// A message as it travels across the bus: an opaque subject plus the
/// serialized event payload, plus whatever the transport needs to
/// acknowledge or negatively-acknowledge it once a handler has run.
/// Domain code never looks inside `payload` — it only ever hands one side
/// a `WalletEvent` it already serialized and receives one back to
/// deserialize.
#[derive(Clone)]
pub struct BusMessage {
    pub subject: String,
    pub payload: Vec<u8>,
    pub ack: Arc<dyn Ack>,
}

impl BusMessage {
    /// Builds a message with no acknowledgment target, for the publish
    /// side of the bus where there is nothing downstream to ack yet.
    pub fn outbound(subject: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            subject: subject.into(),
            payload,
            ack: Arc::new(NoopAck),
        }
    }
}

impl std::fmt::Debug for BusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusMessage")
            .field("subject", &self.subject)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Port the outbox poller publishes through. `publish_jetstream` in the
/// concrete adapter name mirrors the Go ancestor's `jetstream.Publisher`;
/// this trait stays transport-agnostic so the in-memory fake used in tests
/// can stand in for it without a running broker.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: BusMessage) -> Result<(), LedgerError>;
}

/// Port the router subscribes through to receive events for a given
/// subject. Returns an owned receiver rather than a boxed stream so the
/// trait stays object-safe and mockable with `mockall`.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn subscribe(&self, subject: &str) -> Result<mpsc::Receiver<BusMessage>, LedgerError>;
}
