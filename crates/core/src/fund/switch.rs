//! Fund-to-fund switches.
//!
//! A switch moves value from a source fund to a target fund without touching
//! any account. It is stored as two linked rows, a `switch_out` on the source
//! and a `switch_in` on the target, which carry the same `total_amount`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::FundError;
use super::position::FundPosition;
use super::types::MfTransactionType;
use crate::precision;

/// A switch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchInput {
    /// Units redeemed from the source fund.
    pub units: Decimal,
    /// Source fund NAV at the switch.
    pub source_nav: Decimal,
    /// Target fund NAV at the switch.
    pub target_nav: Decimal,
    /// When the switch happened.
    pub transaction_date: NaiveDateTime,
}

/// One side of a switch, as persisted on `mf_transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchLeg {
    /// `switch_out` or `switch_in`.
    pub transaction_type: MfTransactionType,
    /// Units leaving or entering the fund.
    pub units: Decimal,
    /// NAV of the fund this leg belongs to.
    pub nav_per_unit: Decimal,
    /// Value switched, identical on both legs.
    pub total_amount: Decimal,
    /// Realized gain, set on the outgoing leg only.
    pub realized_gain: Option<Decimal>,
    /// Cost basis released by the outgoing leg, or carried in by the incoming one.
    pub cost_basis_of_units_sold: Decimal,
}

/// Both legs of a switch together with the resulting positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchPlan {
    /// `units * source_nav`.
    pub value_switched: Decimal,
    /// Leg recorded on the source fund.
    pub switch_out: SwitchLeg,
    /// Leg recorded on the target fund.
    pub switch_in: SwitchLeg,
    /// Source position after the switch.
    pub source: FundPosition,
    /// Target position after the switch.
    pub target: FundPosition,
}

/// Plans a switch of `input.units` from `source` to `target`.
///
/// The source releases cost basis at its average cost and realizes
/// `value - cost_basis`. The target receives `value / target_nav` units with
/// the switched value as their cost. Invested cash moves from source to
/// target; external cash is untouched on both sides.
///
/// # Errors
///
/// Returns a `FundError` for non-positive units or NAVs, insufficient source
/// units, or a value too small to buy a unit fraction of the target.
pub fn plan_switch(
    source: &FundPosition,
    target: &FundPosition,
    input: &SwitchInput,
) -> Result<SwitchPlan, FundError> {
    let units_out = precision::units(input.units);
    if units_out <= Decimal::ZERO {
        return Err(FundError::NonPositiveUnits);
    }
    let source_nav = precision::price(input.source_nav);
    let target_nav = precision::price(input.target_nav);
    if source_nav <= Decimal::ZERO || target_nav <= Decimal::ZERO {
        return Err(FundError::NonPositiveNav);
    }
    source.ensure_units_available(units_out)?;

    let value = precision::cash(units_out * source_nav);
    let units_in = precision::units(value / target_nav);
    if units_in <= Decimal::ZERO {
        return Err(FundError::NothingSwitchedIn {
            value,
            nav: target_nav,
        });
    }

    let mut source_after = source.clone();
    let cost_basis = source_after.remove_at_average(units_out)?;
    let realized = precision::aggregate(value - cost_basis);
    source_after.book_cash(realized, -cost_basis, Decimal::ZERO);
    source_after.update_nav(source_nav, input.transaction_date)?;

    let mut target_after = target.clone();
    target_after.adjust_holding(units_in, value)?;
    target_after.book_cash(Decimal::ZERO, value, Decimal::ZERO);
    target_after.update_nav(target_nav, input.transaction_date)?;

    Ok(SwitchPlan {
        value_switched: value,
        switch_out: SwitchLeg {
            transaction_type: MfTransactionType::SwitchOut,
            units: units_out,
            nav_per_unit: source_nav,
            total_amount: value,
            realized_gain: Some(realized),
            cost_basis_of_units_sold: cost_basis,
        },
        switch_in: SwitchLeg {
            transaction_type: MfTransactionType::SwitchIn,
            units: units_in,
            nav_per_unit: target_nav,
            total_amount: value,
            realized_gain: None,
            cost_basis_of_units_sold: value,
        },
        source: source_after,
        target: target_after,
    })
}
