pub mod id;

pub use id::Id;

/// Arbitrary-precision money amount. No implicit rounding; equality is
/// value-equality on the canonical form, which `rust_decimal::Decimal`
/// already provides.
pub type Money = rust_decimal::Decimal;
