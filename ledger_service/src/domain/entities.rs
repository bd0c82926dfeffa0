use chrono::{DateTime, Utc};
use common::{Id, Money};
use serde::{Deserialize, Serialize};

/// A wallet is nothing more than an external reference plus the point its
/// event history is anchored to. The balance itself is never stored here —
/// it only ever exists as the output of `reduce` over `wallet_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    id: Id,
    reference_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Builds a brand new wallet under a caller-supplied id (spec.md §6:
    /// the id is a path parameter on wallet creation, not
    /// server-generated). `reference_id` is the external key the
    /// uniqueness constraint is enforced on; it must be non-empty.
    pub fn new(id: Id, reference_id: impl Into<String>) -> Result<Self, crate::domain::error::LedgerError> {
        let reference_id = reference_id.into();
        if reference_id.trim().is_empty() {
            return Err(crate::domain::error::LedgerError::InvalidData(
                "reference_id must not be empty".into(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            reference_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a wallet from data already validated by the database — used
    /// by repositories when mapping rows back into domain entities.
    pub fn reconstitute(
        id: Id,
        reference_id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reference_id,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn reference_id(&self) -> &str {
        &self.reference_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// The event schema version. `reduce` rejects anything greater than the
/// version it knows how to fold.
pub const WALLET_EVENT_VERSION_ONE: i32 = 1;

/// The kind of mutation an event represents.
///
/// Stored as a `SMALLINT` rather than a Postgres enum so that a value
/// written by a newer build of this service (one that has learned a new
/// event type) still round-trips through an older build instead of failing
/// to decode — it shows up here as `Unsupported` and the reducer treats it
/// as a fatal-to-the-fold event rather than refusing to load the whole
/// history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Invalid,
    DebitTransfer,
    CreditTransfer,
    UpdateTransferStatus,
    Unsupported(i16),
}

impl From<i16> for EventType {
    fn from(v: i16) -> Self {
        match v {
            0 => EventType::Invalid,
            1 => EventType::DebitTransfer,
            2 => EventType::CreditTransfer,
            3 => EventType::UpdateTransferStatus,
            other => EventType::Unsupported(other),
        }
    }
}

impl From<EventType> for i16 {
    fn from(e: EventType) -> i16 {
        match e {
            EventType::Invalid => 0,
            EventType::DebitTransfer => 1,
            EventType::CreditTransfer => 2,
            EventType::UpdateTransferStatus => 3,
            EventType::Unsupported(v) => v,
        }
    }
}

/// The lifecycle state a transfer is in at the time a given event was
/// recorded. `UpdateTransferStatus` events carry the status the transfer is
/// moving to; `DebitTransfer`/`CreditTransfer` events carry the status they
/// were created with (`Pending` for a two-phase transfer, `Completed` for
/// an immediate one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

/// A single immutable fact in a wallet's history. Never updated, never
/// deleted — the only way to change a transfer's outcome is to append an
/// `UpdateTransferStatus` event referencing its `transfer_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEvent {
    pub id: Id,
    pub wallet_id: Id,
    pub transfer_id: Id,
    pub reference_id: String,
    pub version: i32,
    pub event_type: EventType,
    pub status: TransferStatus,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

/// The materialized, cached result of folding a wallet's event stream.
/// `last_event_id` is the idempotency watermark: the rebuilder only applies
/// events whose id sorts strictly after it. `pending_debit`/`pending_credit`
/// track the amount encumbered by transfers awaiting settlement; both are
/// always non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletProjection {
    pub wallet_id: Id,
    pub balance: Money,
    pub pending_debit: Money,
    pub pending_credit: Money,
    pub last_event_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalletProjection {
    /// The projection row created in the same transaction as the wallet
    /// itself: all-zero, watermarked with the wallet's own id. No
    /// `WalletEvent` can ever sort before the wallet that owns it, so this
    /// sentinel is always a safe "nothing applied yet" marker.
    pub fn empty(wallet_id: Id) -> Self {
        let now = Utc::now();
        Self {
            wallet_id,
            balance: Money::ZERO,
            pending_debit: Money::ZERO,
            pending_credit: Money::ZERO,
            last_event_id: wallet_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Delivery state of a row in the transactional outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "outbox_status", rename_all = "snake_case")]
pub enum OutboxStatus {
    Queued,
    Published,
}

/// A fact waiting to be relayed to the message bus, inserted in the same
/// transaction as the `WalletEvent` it describes so publication can never
/// race ahead of — or silently drop — the write it announces.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxMessage {
    pub id: Id,
    pub publisher_type: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboxMessage {
    pub fn new(publisher_type: impl Into<String>, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Id::new(),
            publisher_type: publisher_type.into(),
            payload,
            status: OutboxStatus::Queued,
            created_at: now,
            updated_at: now,
        }
    }
}
