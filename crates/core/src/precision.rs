//! Scale and rounding rules for stored quantities.
//!
//! Every helper rounds half away from zero, which is what PostgreSQL does when
//! a value is written into a `NUMERIC(p, s)` column. Computing with the same
//! rule keeps in-memory positions identical to what a re-read would return.

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale of mutual fund unit counts.
pub const UNIT_SCALE: u32 = 3;
/// Scale of NAVs and per-unit prices.
pub const PRICE_SCALE: u32 = 4;
/// Scale of cumulative monetary aggregates (average cost, realized gain, invested cash).
pub const AGGREGATE_SCALE: u32 = 4;
/// Scale of cash amounts booked against accounts.
pub const CASH_SCALE: u32 = 2;
/// Scale of physical asset quantities.
pub const QUANTITY_SCALE: u32 = 6;

/// Rounds `value` to `scale` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a mutual fund unit count.
#[must_use]
pub fn units(value: Decimal) -> Decimal {
    round_to(value, UNIT_SCALE)
}

/// Rounds a NAV or price per unit.
#[must_use]
pub fn price(value: Decimal) -> Decimal {
    round_to(value, PRICE_SCALE)
}

/// Rounds a cumulative monetary aggregate.
#[must_use]
pub fn aggregate(value: Decimal) -> Decimal {
    round_to(value, AGGREGATE_SCALE)
}

/// Rounds a cash amount.
#[must_use]
pub fn cash(value: Decimal) -> Decimal {
    round_to(value, CASH_SCALE)
}

/// Rounds a physical asset quantity.
#[must_use]
pub fn quantity(value: Decimal) -> Decimal {
    round_to(value, QUANTITY_SCALE)
}
