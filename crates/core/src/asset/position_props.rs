//! Property-based tests for physical asset positions.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::position::{AssetPosition, AssetTradeInput, AssetTransactionType, RecordedAssetTrade};

/// Strategy to generate quantities (0.000001 to 1,000.000000).
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

/// Strategy to generate prices (0.01 to 100,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a trade history of buys and partial sells.
fn history() -> impl Strategy<Value = Vec<(bool, Decimal, Decimal)>> {
    prop::collection::vec((any::<bool>(), quantity(), price()), 1..12)
}

fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(i64::try_from(offset).unwrap())
}

/// Applies the history incrementally, skipping sells the holding cannot cover.
fn build(steps: &[(bool, Decimal, Decimal)]) -> (AssetPosition, Vec<RecordedAssetTrade>) {
    let mut position = AssetPosition::default();
    let mut applied = Vec::new();
    for (offset, (is_sell, quantity, price)) in steps.iter().enumerate() {
        let kind = if *is_sell {
            AssetTransactionType::Sell
        } else {
            AssetTransactionType::Buy
        };
        let input = AssetTradeInput {
            transaction_type: kind,
            quantity: *quantity,
            price_per_unit: *price,
            transaction_date: day(offset),
        };
        if let Ok(total) = position.apply_trade(&input) {
            applied.push(RecordedAssetTrade {
                transaction_type: kind,
                quantity: *quantity,
                price_per_unit: *price,
                total_amount: total,
                transaction_date: input.transaction_date,
            });
        }
    }
    (position, applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Replaying the accepted history reproduces the incremental position.
    #[test]
    fn prop_replay_equals_incremental(steps in history()) {
        let (position, applied) = build(&steps);
        prop_assert_eq!(AssetPosition::replay(&applied), position);
    }

    /// Dropping a trade and replaying equals building from the remaining trades.
    #[test]
    fn prop_delete_then_replay(steps in history(), pick in any::<prop::sample::Index>()) {
        let (_, applied) = build(&steps);
        prop_assume!(!applied.is_empty());
        let mut remaining = applied.clone();
        remaining.remove(pick.index(applied.len()));

        let replayed = AssetPosition::replay(&remaining);
        prop_assert!(replayed.total_quantity >= Decimal::ZERO);
        prop_assert!(replayed.average_cost_per_unit >= Decimal::ZERO);
        if replayed.total_quantity.is_zero() {
            prop_assert_eq!(replayed.average_cost_per_unit, Decimal::ZERO);
        }
        match remaining.last() {
            Some(last) => prop_assert_eq!(replayed.last_price_update, Some(last.transaction_date)),
            None => prop_assert_eq!(replayed, AssetPosition::default()),
        }
    }
}
