use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Time-sortable 128-bit identifier.
///
/// Backed by a ULID: byte- and string-lexicographic order matches creation
/// order. `Wallet::id`, `WalletEvent::id` and `OutboxMessage::id` all use
/// this type, per the identifier contract — the reducer and the projection
/// rebuilder both compare these as plain strings to decide ordering and
/// idempotency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(Ulid);

impl Id {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl From<Ulid> for Id {
    fn from(u: Ulid) -> Self {
        Self(u)
    }
}

impl From<Id> for Ulid {
    fn from(id: Id) -> Self {
        id.0
    }
}

// Stored as fixed-width (26 char) Crockford base32 text. This preserves the
// byte-lexicographic ordering the ledger depends on without needing a custom
// Postgres domain/extension.
impl sqlx::Type<sqlx::Postgres> for Id {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for Id {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0.to_string(), buf)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for Id {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(Ulid::from_string(&raw)?))
    }
}

// The teacher gets a `ToSchema` impl for its id fields for free from
// utoipa's `uuid` feature; there is no equivalent feature for a ulid-backed
// newtype, so it is hand-written here the same way that feature's own impl
// renders a `Uuid` — as a plain string schema, since the wire format (and
// the `sqlx::Type` impl above) is already the 26-char Crockford base32
// text form.
impl utoipa::PartialSchema for Id {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        utoipa::openapi::ObjectBuilder::new()
            .schema_type(utoipa::openapi::schema::SchemaType::Type(utoipa::openapi::schema::Type::String))
            .description(Some("Time-sortable 128-bit identifier (ULID), as 26-character Crockford base32 text"))
            .build()
            .into()
    }
}

impl utoipa::ToSchema for Id {
    fn name() -> std::borrow::Cow<'static, str> {
        std::borrow::Cow::Borrowed("Id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_order_matches_creation_order() {
        let first = Id::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = Id::new();

        assert!(first < second);
        assert!(first.to_string() < second.to_string());
    }

    #[test]
    fn round_trips_through_display_and_from_str() {
        let id = Id::new();
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
