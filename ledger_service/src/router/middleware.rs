use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info};

use crate::domain::bus::BusMessage;
use crate::domain::error::LedgerError;

use super::handler::Handler;

/// Runs a handler for one message with the concerns the Go ancestor's
/// `router.Middleware` chain applied to every handler, in order: an
/// auto-ack/nack step driven by the handler's outcome, structured logging
/// around the call, and recovery from a panicking handler so one bad
/// message can't take down a worker the rest of the subject depends on
/// (spec.md §4.6).
///
/// There is no `AtomicTransactionMiddleware` here — each handler (really,
/// each use case it delegates to) already opens and closes its own
/// transaction, so wrapping the dispatch call in another one would buy
/// nothing.
pub async fn dispatch(handler: Arc<dyn Handler>, message: BusMessage) -> Result<(), LedgerError> {
    let name = handler.name().to_string();
    let subject = message.subject.clone();
    let ack = message.ack.clone();
    info!(handler = %name, subject = %subject, "handling message");

    let result = AssertUnwindSafe(handler.handle(message)).catch_unwind().await;

    match result {
        Ok(Ok(())) => {
            ack.ack().await;
            info!(handler = %name, subject = %subject, "handled message");
            Ok(())
        }
        Ok(Err(err)) => {
            ack.nack().await;
            error!(handler = %name, subject = %subject, error = %err, "handler returned an error");
            Err(err)
        }
        Err(panic) => {
            ack.nack().await;
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(handler = %name, subject = %subject, panic = %reason, "handler panicked");
            Err(LedgerError::Bus(format!("handler {name} panicked: {reason}")))
        }
    }
}
