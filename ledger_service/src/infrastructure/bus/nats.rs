use async_nats::jetstream::{self, consumer::pull::Config as PullConfig, AckKind};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::domain::bus::{Ack, BusMessage, Publisher, Subscriber};
use crate::domain::error::LedgerError;

/// Wraps one pulled JetStream message so the router's middleware can ack
/// or nack it once the handler has actually run, instead of acking the
/// moment it comes off the wire (which would turn a handler crash into a
/// silently dropped event).
struct JetStreamAck(jetstream::Message);

#[async_trait]
impl Ack for JetStreamAck {
    async fn ack(&self) {
        if let Err(err) = self.0.ack().await {
            warn!(error = %err, "failed to ack jetstream message");
        }
    }

    async fn nack(&self) {
        if let Err(err) = self.0.ack_with(AckKind::Nak(None)).await {
            warn!(error = %err, "failed to nack jetstream message");
        }
    }
}

/// The only bus this service actually ships against: NATS JetStream,
/// addressed the same way the Go ancestor's `jetstream.Publisher` did —
/// one stream (`WALLET_EVENTS`) carrying subjects of the form
/// `wallet_events.<event>`.
pub struct JetStreamBus {
    context: jetstream::Context,
}

const STREAM_NAME: &str = "WALLET_EVENTS";
const STREAM_SUBJECTS: &str = "wallet_events.>";

impl JetStreamBus {
    pub async fn connect(url: &str) -> Result<Self, LedgerError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?;
        let context = jetstream::new(client);

        // Stream creation is idempotent on the server side: calling it
        // again against an already-existing stream of the same config is
        // a no-op rather than an error.
        context
            .get_or_create_stream(jetstream::stream::Config {
                name: STREAM_NAME.to_string(),
                subjects: vec![STREAM_SUBJECTS.to_string()],
                ..Default::default()
            })
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?;

        Ok(Self { context })
    }
}

#[async_trait]
impl Publisher for JetStreamBus {
    async fn publish(&self, message: BusMessage) -> Result<(), LedgerError> {
        self.context
            .publish(message.subject, message.payload.into())
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Subscriber for JetStreamBus {
    async fn subscribe(&self, subject: &str) -> Result<mpsc::Receiver<BusMessage>, LedgerError> {
        let stream = self
            .context
            .get_stream(STREAM_NAME)
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?;

        let consumer_name = subject.replace('.', "_");
        let consumer = stream
            .get_or_create_consumer(
                &consumer_name,
                PullConfig {
                    durable_name: Some(consumer_name.clone()),
                    filter_subject: subject.to_string(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| LedgerError::Bus(err.to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut messages = match consumer.messages().await {
                Ok(messages) => messages,
                Err(err) => {
                    error!(error = %err, "failed to open jetstream consumer message stream");
                    return;
                }
            };
            while let Some(next) = messages.next().await {
                match next {
                    Ok(message) => {
                        let bus_message = BusMessage {
                            subject: message.subject.to_string(),
                            payload: message.payload.to_vec(),
                            ack: Arc::new(JetStreamAck(message)),
                        };
                        if tx.send(bus_message).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        error!(error = %err, "error pulling jetstream message");
                    }
                }
            }
        });

        Ok(rx)
    }
}
