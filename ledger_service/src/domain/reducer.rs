//! The pure fold at the heart of the ledger: given a wallet's full ordered
//! event history, produce the `WalletProjection` it implies. No I/O, no
//! clock reads beyond what's already on the events — every caller (the
//! credit balance check on the write path, the rebuilder, the tests) gets
//! identical behavior for identical input.
//!
//! `events` must already be sorted by `id` ascending (the time-sortable
//! property — see `common::Id`). This is a full-replay reducer, not an
//! incremental one: every call folds the entire slice handed to it from a
//! zero-valued projection, rather than advancing an existing one. That is
//! deliberate — see spec.md §4.5's rationale for the rebuilder, which this
//! reducer exists to serve.

use std::collections::HashMap;

use common::Id;
use tracing::warn;

use super::entities::{EventType, TransferStatus, WalletEvent, WalletProjection, WALLET_EVENT_VERSION_ONE};
use super::error::LedgerError;

/// One transfer awaiting settlement: which side it encumbers and how much.
#[derive(Debug, Clone, Copy)]
struct PendingEntry {
    side: EventType,
    amount: common::Money,
}

/// Folds `events` into a fresh `WalletProjection` for `wallet_id`.
///
/// Aborts on the first structurally invalid event (unsupported version,
/// `Invalid`/`Unsupported` event type) — those are data-corruption level
/// problems, not business-level edge cases, and the caller gets a
/// zero-valued projection back alongside the error. Everything else
/// (duplicate pending-inits, status updates for transfers this wallet
/// never had pending) is a warn-and-skip: the fold keeps going and the
/// projection it produces is exactly as if the offending event had never
/// been appended.
pub fn reduce(wallet_id: Id, events: &[WalletEvent]) -> Result<WalletProjection, LedgerError> {
    let mut projection = WalletProjection::empty(wallet_id);
    let mut pending_index: HashMap<Id, PendingEntry> = HashMap::new();

    for event in events {
        apply(&mut projection, &mut pending_index, event)?;
        projection.last_event_id = event.id;
    }

    if let Some(last) = events.last() {
        projection.wallet_id = last.wallet_id;
    }

    Ok(projection)
}

fn apply(
    projection: &mut WalletProjection,
    pending_index: &mut HashMap<Id, PendingEntry>,
    event: &WalletEvent,
) -> Result<(), LedgerError> {
    if event.version > WALLET_EVENT_VERSION_ONE {
        return Err(LedgerError::UnsupportedEventVersion);
    }

    match event.event_type {
        EventType::Invalid => Err(LedgerError::InvalidEventType),
        EventType::Unsupported(_) => Err(LedgerError::UnsupportedEventType),
        EventType::DebitTransfer => apply_debit(projection, pending_index, event),
        EventType::CreditTransfer => apply_credit(projection, pending_index, event),
        EventType::UpdateTransferStatus => apply_status_update(projection, pending_index, event),
    }
}

/// A debit transfer is money entering the wallet.
fn apply_debit(
    projection: &mut WalletProjection,
    pending_index: &mut HashMap<Id, PendingEntry>,
    event: &WalletEvent,
) -> Result<(), LedgerError> {
    match event.status {
        TransferStatus::Pending => {
            if pending_index.contains_key(&event.transfer_id) {
                warn!(transfer_id = %event.transfer_id, "duplicate pending debit transfer_id, skipping");
                return Ok(());
            }
            pending_index.insert(
                event.transfer_id,
                PendingEntry {
                    side: EventType::DebitTransfer,
                    amount: event.amount,
                },
            );
            projection.pending_debit += event.amount;
        }
        TransferStatus::Failed => {}
        TransferStatus::Completed => {
            projection.balance += event.amount;
        }
    }
    Ok(())
}

/// A credit transfer is money leaving the wallet. It encumbers the balance
/// as soon as it is initiated — the write service is responsible for
/// never letting a pending credit initiate past the available balance.
fn apply_credit(
    projection: &mut WalletProjection,
    pending_index: &mut HashMap<Id, PendingEntry>,
    event: &WalletEvent,
) -> Result<(), LedgerError> {
    match event.status {
        TransferStatus::Pending => {
            if pending_index.contains_key(&event.transfer_id) {
                warn!(transfer_id = %event.transfer_id, "duplicate pending credit transfer_id, skipping");
                return Ok(());
            }
            pending_index.insert(
                event.transfer_id,
                PendingEntry {
                    side: EventType::CreditTransfer,
                    amount: event.amount,
                },
            );
            projection.pending_credit += event.amount;
            projection.balance -= event.amount;
        }
        TransferStatus::Failed => {}
        // Any other status (i.e. an immediate `Completed` credit, per
        // spec.md §9 Open Question 1) debits the balance the same way a
        // pending one does, with no pending-side bookkeeping.
        _ => {
            projection.balance -= event.amount;
        }
    }
    Ok(())
}

fn apply_status_update(
    projection: &mut WalletProjection,
    pending_index: &mut HashMap<Id, PendingEntry>,
    event: &WalletEvent,
) -> Result<(), LedgerError> {
    let Some(origin) = pending_index.get(&event.transfer_id).copied() else {
        warn!(transfer_id = %event.transfer_id, "status update for a transfer with no pending origin, skipping");
        return Ok(());
    };

    match event.status {
        TransferStatus::Pending => {}
        TransferStatus::Failed => {
            match origin.side {
                EventType::DebitTransfer => projection.pending_debit -= origin.amount,
                EventType::CreditTransfer => {
                    projection.pending_credit -= origin.amount;
                    projection.balance += origin.amount;
                }
                _ => unreachable!("pending entries are only ever recorded for debit/credit transfers"),
            }
            pending_index.remove(&event.transfer_id);
        }
        TransferStatus::Completed => {
            match origin.side {
                EventType::DebitTransfer => {
                    projection.pending_debit -= origin.amount;
                    projection.balance += origin.amount;
                }
                EventType::CreditTransfer => projection.pending_credit -= origin.amount,
                _ => unreachable!("pending entries are only ever recorded for debit/credit transfers"),
            }
            pending_index.remove(&event.transfer_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Id, Money};
    use rstest::rstest;

    fn event(
        wallet_id: Id,
        transfer_id: Id,
        event_type: EventType,
        status: TransferStatus,
        amount: &str,
    ) -> WalletEvent {
        WalletEvent {
            id: Id::new(),
            wallet_id,
            transfer_id,
            reference_id: "ref".to_string(),
            version: WALLET_EVENT_VERSION_ONE,
            event_type,
            status,
            amount: amount.parse::<Money>().unwrap(),
            created_at: Utc::now(),
        }
    }

    /// S1: immediate debit.
    #[test]
    fn immediate_completed_debit_adds_straight_to_balance() {
        let wallet_id = Id::new();
        let debit = event(
            wallet_id,
            Id::new(),
            EventType::DebitTransfer,
            TransferStatus::Completed,
            "100.00",
        );
        let projection = reduce(wallet_id, std::slice::from_ref(&debit)).unwrap();

        assert_eq!(projection.balance, "100.00".parse::<Money>().unwrap());
        assert_eq!(projection.pending_debit, Money::ZERO);
        assert_eq!(projection.last_event_id, debit.id);
    }

    /// S2: two-phase debit.
    #[test]
    fn pending_debit_then_complete_moves_pending_into_balance() {
        let wallet_id = Id::new();
        let transfer_id = Id::new();
        let pending = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "50.00",
        );
        let complete = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Completed,
            "0",
        );

        let projection = reduce(wallet_id, &[pending, complete]).unwrap();

        assert_eq!(projection.balance, "50.00".parse::<Money>().unwrap());
        assert_eq!(projection.pending_debit, Money::ZERO);
    }

    /// S3: two-phase credit happy path, on top of a 100 balance.
    #[test]
    fn pending_credit_encumbers_balance_then_completes() {
        let wallet_id = Id::new();
        let seed = event(
            wallet_id,
            Id::new(),
            EventType::DebitTransfer,
            TransferStatus::Completed,
            "100.00",
        );
        let transfer_id = Id::new();
        let pending_credit = event(
            wallet_id,
            transfer_id,
            EventType::CreditTransfer,
            TransferStatus::Pending,
            "30.00",
        );

        let mid = reduce(wallet_id, &[seed.clone(), pending_credit.clone()]).unwrap();
        assert_eq!(mid.balance, "70.00".parse::<Money>().unwrap());
        assert_eq!(mid.pending_credit, "30.00".parse::<Money>().unwrap());

        let complete = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Completed,
            "0",
        );
        let done = reduce(wallet_id, &[seed, pending_credit, complete]).unwrap();
        assert_eq!(done.balance, "70.00".parse::<Money>().unwrap());
        assert_eq!(done.pending_credit, Money::ZERO);
    }

    /// S4: reverting a pending credit restores the balance.
    #[test]
    fn reverted_credit_restores_balance() {
        let wallet_id = Id::new();
        let seed = event(
            wallet_id,
            Id::new(),
            EventType::DebitTransfer,
            TransferStatus::Completed,
            "100.00",
        );
        let transfer_id = Id::new();
        let pending_credit = event(
            wallet_id,
            transfer_id,
            EventType::CreditTransfer,
            TransferStatus::Pending,
            "40.00",
        );
        let revert = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Failed,
            "0",
        );

        let projection = reduce(wallet_id, &[seed, pending_credit, revert]).unwrap();
        assert_eq!(projection.balance, "100.00".parse::<Money>().unwrap());
        assert_eq!(projection.pending_credit, Money::ZERO);
    }

    /// S7: duplicate pending-init is a no-op, not a double-count.
    #[test]
    fn duplicate_pending_debit_transfer_id_is_ignored() {
        let wallet_id = Id::new();
        let transfer_id = Id::new();
        let first = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "10.00",
        );
        let duplicate = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "10.00",
        );

        let projection = reduce(wallet_id, &[first, duplicate]).unwrap();
        assert_eq!(projection.pending_debit, "10.00".parse::<Money>().unwrap());
    }

    /// S8: a status update for a transfer this wallet never saw pending is
    /// a no-op, and does not abort the fold.
    #[test]
    fn status_update_for_unknown_transfer_is_a_no_op() {
        let wallet_id = Id::new();
        let update = event(
            wallet_id,
            Id::new(),
            EventType::UpdateTransferStatus,
            TransferStatus::Completed,
            "10.00",
        );
        let projection = reduce(wallet_id, std::slice::from_ref(&update)).unwrap();
        assert_eq!(projection.balance, Money::ZERO);
        assert_eq!(projection.last_event_id, update.id);
    }

    /// Invariant 3 / S8 combined: a stale status update for an already
    /// terminal transfer does not change anything further.
    #[test]
    fn stale_status_update_after_settlement_is_idempotent() {
        let wallet_id = Id::new();
        let transfer_id = Id::new();
        let pending = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "10.00",
        );
        let complete = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Completed,
            "0",
        );
        let stale_again = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Completed,
            "0",
        );

        let without_stale = reduce(wallet_id, &[pending.clone(), complete.clone()]).unwrap();
        let with_stale = reduce(wallet_id, &[pending, complete, stale_again]).unwrap();

        assert_eq!(without_stale.balance, with_stale.balance);
        assert_eq!(without_stale.pending_debit, with_stale.pending_debit);
    }

    #[test]
    fn failed_pending_debit_never_touched_the_balance() {
        let wallet_id = Id::new();
        let transfer_id = Id::new();
        let pending = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "10.00",
        );
        let fail = event(
            wallet_id,
            transfer_id,
            EventType::UpdateTransferStatus,
            TransferStatus::Failed,
            "0",
        );

        let projection = reduce(wallet_id, &[pending, fail]).unwrap();
        assert_eq!(projection.balance, Money::ZERO);
        assert_eq!(projection.pending_debit, Money::ZERO);
    }

    #[test]
    fn failed_event_status_is_skipped_entirely() {
        let wallet_id = Id::new();
        let failed_debit = event(
            wallet_id,
            Id::new(),
            EventType::DebitTransfer,
            TransferStatus::Failed,
            "10.00",
        );
        let failed_credit = event(
            wallet_id,
            Id::new(),
            EventType::CreditTransfer,
            TransferStatus::Failed,
            "10.00",
        );
        let projection = reduce(wallet_id, &[failed_debit, failed_credit]).unwrap();
        assert_eq!(projection.balance, Money::ZERO);
        assert_eq!(projection.pending_debit, Money::ZERO);
        assert_eq!(projection.pending_credit, Money::ZERO);
    }

    #[test]
    fn invalid_event_type_aborts_the_fold() {
        let wallet_id = Id::new();
        let bad = event(
            wallet_id,
            Id::new(),
            EventType::Invalid,
            TransferStatus::Pending,
            "1.00",
        );
        let err = reduce(wallet_id, std::slice::from_ref(&bad)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidEventType));
    }

    #[test]
    fn unsupported_event_type_aborts_the_fold() {
        let wallet_id = Id::new();
        let bad = event(
            wallet_id,
            Id::new(),
            EventType::Unsupported(99),
            TransferStatus::Pending,
            "1.00",
        );
        let err = reduce(wallet_id, std::slice::from_ref(&bad)).unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedEventType));
    }

    #[test]
    fn unsupported_event_version_aborts_the_fold() {
        let wallet_id = Id::new();
        let mut bad = event(
            wallet_id,
            Id::new(),
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "1.00",
        );
        bad.version = WALLET_EVENT_VERSION_ONE + 1;
        let err = reduce(wallet_id, std::slice::from_ref(&bad)).unwrap_err();
        assert!(matches!(err, LedgerError::UnsupportedEventVersion));
    }

    /// Invariant 7 / S9: applying the same events twice (e.g. the
    /// rebuilder replaying from scratch after a redelivered message)
    /// converges to the same projection.
    #[test]
    fn replaying_the_same_history_twice_converges() {
        let wallet_id = Id::new();
        let transfer_id = Id::new();
        let pending = event(
            wallet_id,
            transfer_id,
            EventType::DebitTransfer,
            TransferStatus::Pending,
            "10.00",
        );
        let first = reduce(wallet_id, std::slice::from_ref(&pending)).unwrap();
        let second = reduce(wallet_id, std::slice::from_ref(&pending)).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(EventType::DebitTransfer, "0")]
    #[case(EventType::CreditTransfer, "-50.00")]
    fn pending_creation_events_affect_balance_per_event_type(
        #[case] event_type: EventType,
        #[case] expected_balance: &str,
    ) {
        let wallet_id = Id::new();
        let e = event(wallet_id, Id::new(), event_type, TransferStatus::Pending, "50.00");
        let projection = reduce(wallet_id, std::slice::from_ref(&e)).unwrap();
        assert_eq!(projection.balance, expected_balance.parse::<Money>().unwrap());
    }

    #[test]
    fn pending_debit_and_pending_credit_never_go_negative_across_prefixes() {
        let wallet_id = Id::new();
        let transfer_a = Id::new();
        let transfer_b = Id::new();
        let events = [
            event(wallet_id, transfer_a, EventType::DebitTransfer, TransferStatus::Pending, "10.00"),
            event(
                wallet_id,
                transfer_a,
                EventType::UpdateTransferStatus,
                TransferStatus::Completed,
                "0",
            ),
            event(wallet_id, transfer_b, EventType::CreditTransfer, TransferStatus::Pending, "5.00"),
        ];

        for prefix_len in 1..=events.len() {
            let projection = reduce(wallet_id, &events[..prefix_len]).unwrap();
            assert!(projection.pending_debit >= Money::ZERO);
            assert!(projection.pending_credit >= Money::ZERO);
        }
    }
}
