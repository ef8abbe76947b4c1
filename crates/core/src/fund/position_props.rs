//! Property-based tests for fund positions.
//!
//! - Selling never moves the average cost
//! - Reversing the latest buy restores units and cash aggregates
//! - The charge split always sums to the total amount
//! - A switch moves invested cash from source to target plus the realized gain

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::position::FundPosition;
use super::reversal::RecordedMfTransaction;
use super::switch::{SwitchInput, plan_switch};
use super::trade::{ChargeSplit, TradeInput, TradeSide};

/// Strategy to generate unit counts (0.001 to 10,000.000).
fn unit_count() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|v| Decimal::new(v, 3))
}

/// Strategy to generate cash amounts (0.01 to 1,000,000.00).
fn cash_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate charges (0.00 to 500.00).
fn charge_amount() -> impl Strategy<Value = Decimal> {
    (0i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate NAVs (1.0000 to 1,000.0000).
fn nav() -> impl Strategy<Value = Decimal> {
    (10_000i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn trade_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn buy(units: Decimal, amount: Decimal) -> TradeInput {
    TradeInput {
        side: TradeSide::Buy,
        units,
        charges: ChargeSplit::new(amount, Decimal::ZERO).unwrap(),
        transaction_date: trade_date(),
    }
}

/// Builds a position from a first buy sized so the NAV stays in a sane range.
fn seeded(units: Decimal, nav: Decimal) -> FundPosition {
    let mut position = FundPosition::default();
    let amount = (units * nav).round_dp(2).max(Decimal::new(1, 2));
    position.apply_trade(&buy(units, amount)).unwrap();
    position
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Selling part of a holding leaves the average cost untouched.
    #[test]
    fn prop_sell_keeps_average_cost(
        units in unit_count(),
        buy_nav in nav(),
        fraction in 1u32..100,
        sale_nav in nav(),
        charges in charge_amount(),
    ) {
        let mut position = seeded(units, buy_nav);
        let average = position.average_cost_per_unit;
        let to_sell = (units * Decimal::from(fraction) / Decimal::from(100)).round_dp(3);
        prop_assume!(to_sell > Decimal::ZERO && to_sell < units);
        let proceeds = (to_sell * sale_nav).round_dp(2).max(Decimal::new(1, 2));

        let sale = TradeInput {
            side: TradeSide::Sell,
            units: to_sell,
            charges: ChargeSplit::new(proceeds, charges).unwrap(),
            transaction_date: trade_date(),
        };
        position.apply_trade(&sale).unwrap();

        prop_assert_eq!(position.average_cost_per_unit, average);
    }

    /// Reversing the latest buy restores units and cash aggregates exactly.
    #[test]
    fn prop_reverse_buy_restores_aggregates(
        first_units in unit_count(),
        first_nav in nav(),
        units in unit_count(),
        buy_nav in nav(),
    ) {
        let mut position = seeded(first_units, first_nav);
        let before = position.clone();
        let amount = (units * buy_nav).round_dp(2).max(Decimal::new(1, 2));
        let outcome = position.apply_trade(&buy(units, amount)).unwrap();

        position.reverse(&RecordedMfTransaction {
            transaction_type: outcome.side.into(),
            units: outcome.units,
            amount_excluding_charges: outcome.amount_excluding_charges,
            realized_gain: Some(outcome.realized_gain),
            cost_basis_of_units_sold: Some(outcome.cost_basis_of_units_sold),
        }).unwrap();

        prop_assert_eq!(position.total_units, before.total_units);
        prop_assert_eq!(position.total_realized_gain, before.total_realized_gain);
        prop_assert_eq!(position.total_invested_cash, before.total_invested_cash);
        prop_assert_eq!(position.external_cash_invested, before.external_cash_invested);
    }

    /// The gross amount is the fund amount plus charges.
    #[test]
    fn prop_charge_split_sums(
        amount in cash_amount(),
        charges in charge_amount(),
    ) {
        let split = ChargeSplit::new(amount, charges).unwrap();
        prop_assert_eq!(
            split.total_amount(),
            split.amount_excluding_charges() + split.other_charges()
        );
    }

    /// Switch legs agree on value, and invested cash grows by the realized gain.
    #[test]
    fn prop_switch_conserves_invested_cash(
        units in unit_count(),
        buy_nav in nav(),
        fraction in 1u32..=100,
        source_nav in nav(),
        target_nav in nav(),
    ) {
        let source = seeded(units, buy_nav);
        let target = FundPosition::default();
        let to_switch = (units * Decimal::from(fraction) / Decimal::from(100)).round_dp(3);
        prop_assume!(to_switch > Decimal::ZERO);

        let result = plan_switch(&source, &target, &SwitchInput {
            units: to_switch,
            source_nav,
            target_nav,
            transaction_date: trade_date(),
        });
        prop_assume!(result.is_ok());
        let plan = result.unwrap();

        prop_assert_eq!(plan.switch_out.total_amount, plan.switch_in.total_amount);
        let realized = plan.switch_out.realized_gain.unwrap();
        let invested_before = source.total_invested_cash + target.total_invested_cash;
        let invested_after = plan.source.total_invested_cash + plan.target.total_invested_cash;
        prop_assert_eq!(invested_after - invested_before, realized);
        prop_assert_eq!(plan.source.external_cash_invested, source.external_cash_invested);
        prop_assert_eq!(plan.source.average_cost_per_unit.is_zero(), plan.source.is_empty());
    }
}
