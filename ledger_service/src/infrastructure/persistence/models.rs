use chrono::{DateTime, Utc};
use common::{Id, Money};

use crate::domain::entities::{
    EventType, OutboxMessage, OutboxStatus, TransferStatus, Wallet, WalletEvent, WalletProjection,
};

/// Row shape of the `wallets` table. Kept separate from `Wallet` so the
/// domain entity never has to know how it is persisted — the conversions
/// below are the only place that couples the two.
#[derive(Debug, sqlx::FromRow)]
pub struct WalletModel {
    pub id: Id,
    pub reference_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WalletModel> for Wallet {
    fn from(m: WalletModel) -> Self {
        Wallet::reconstitute(m.id, m.reference_id, m.created_at, m.updated_at)
    }
}

impl From<&Wallet> for WalletModel {
    fn from(w: &Wallet) -> Self {
        Self {
            id: w.id(),
            reference_id: w.reference_id().to_string(),
            created_at: w.created_at(),
            updated_at: w.updated_at(),
        }
    }
}

/// Row shape of the `wallet_events` table. `event_type` is stored as a
/// plain `SMALLINT` rather than a Postgres enum — see
/// [`crate::domain::entities::EventType`] for why.
#[derive(Debug, sqlx::FromRow)]
pub struct WalletEventModel {
    pub id: Id,
    pub wallet_id: Id,
    pub transfer_id: Id,
    pub reference_id: String,
    pub version: i32,
    pub event_type: i16,
    pub status: TransferStatus,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

impl From<WalletEventModel> for WalletEvent {
    fn from(m: WalletEventModel) -> Self {
        WalletEvent {
            id: m.id,
            wallet_id: m.wallet_id,
            transfer_id: m.transfer_id,
            reference_id: m.reference_id,
            version: m.version,
            event_type: EventType::from(m.event_type),
            status: m.status,
            amount: m.amount,
            created_at: m.created_at,
        }
    }
}

impl From<&WalletEvent> for WalletEventModel {
    fn from(e: &WalletEvent) -> Self {
        Self {
            id: e.id,
            wallet_id: e.wallet_id,
            transfer_id: e.transfer_id,
            reference_id: e.reference_id.clone(),
            version: e.version,
            event_type: e.event_type.into(),
            status: e.status,
            amount: e.amount,
            created_at: e.created_at,
        }
    }
}

/// Row shape of the `wallet_projections` table.
#[derive(Debug, sqlx::FromRow)]
pub struct WalletProjectionModel {
    pub wallet_id: Id,
    pub balance: Money,
    pub pending_debit: Money,
    pub pending_credit: Money,
    pub last_event_id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WalletProjectionModel> for WalletProjection {
    fn from(m: WalletProjectionModel) -> Self {
        WalletProjection {
            wallet_id: m.wallet_id,
            balance: m.balance,
            pending_debit: m.pending_debit,
            pending_credit: m.pending_credit,
            last_event_id: m.last_event_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&WalletProjection> for WalletProjectionModel {
    fn from(p: &WalletProjection) -> Self {
        Self {
            wallet_id: p.wallet_id,
            balance: p.balance,
            pending_debit: p.pending_debit,
            pending_credit: p.pending_credit,
            last_event_id: p.last_event_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Row shape of the `outbox_messages` table.
#[derive(Debug, sqlx::FromRow)]
pub struct OutboxMessageModel {
    pub id: Id,
    pub publisher_type: String,
    pub payload: sqlx::types::Json<serde_json::Value>,
    pub status: OutboxStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OutboxMessageModel> for OutboxMessage {
    fn from(m: OutboxMessageModel) -> Self {
        OutboxMessage {
            id: m.id,
            publisher_type: m.publisher_type,
            payload: m.payload.0,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&OutboxMessage> for OutboxMessageModel {
    fn from(o: &OutboxMessage) -> Self {
        Self {
            id: o.id,
            publisher_type: o.publisher_type.clone(),
            payload: sqlx::types::Json(o.payload.clone()),
            status: o.status,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}
