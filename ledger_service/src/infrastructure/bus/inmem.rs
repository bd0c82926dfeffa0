use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::domain::bus::{BusMessage, Publisher, Subscriber};
use crate::domain::error::LedgerError;

/// A process-local stand-in for the message bus. Used by integration tests
/// and by `main.rs` when no `NATS_URL` is configured, so the service can
/// run end-to-end (outbox poller included) without a broker on the box.
#[derive(Default)]
pub struct InMemoryBus {
    senders: Mutex<HashMap<String, Vec<mpsc::Sender<BusMessage>>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, message: BusMessage) -> Result<(), LedgerError> {
        let senders = {
            let guard = self.senders.lock().expect("in-memory bus mutex poisoned");
            guard.get(&message.subject).cloned().unwrap_or_default()
        };
        for sender in senders {
            // A subscriber that dropped its receiver just stops getting
            // traffic; it is not the publisher's problem.
            let _ = sender.send(message.clone()).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Subscriber for InMemoryBus {
    async fn subscribe(&self, subject: &str) -> Result<mpsc::Receiver<BusMessage>, LedgerError> {
        let (tx, rx) = mpsc::channel(64);
        self.senders
            .lock()
            .expect("in-memory bus mutex poisoned")
            .entry(subject.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn published_message_reaches_every_subscriber_of_its_subject() {
        let bus = InMemoryBus::new();
        let mut a = bus.subscribe("wallet_events.created").await.unwrap();
        let mut b = bus.subscribe("wallet_events.created").await.unwrap();
        let mut other = bus.subscribe("wallet_events.other").await.unwrap();

        bus.publish(BusMessage::outbound("wallet_events.created", b"hello".to_vec()))
            .await
            .unwrap();

        assert_eq!(a.recv().await.unwrap().payload, b"hello");
        assert_eq!(b.recv().await.unwrap().payload, b"hello");
        assert!(other.try_recv().is_err());
    }
}
