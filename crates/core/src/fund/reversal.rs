//! Reversal of recorded fund transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::FundError;
use super::position::FundPosition;
use super::types::MfTransactionType;

/// Fields of a stored `mf_transactions` row that its reversal depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMfTransaction {
    /// Kind of the row.
    pub transaction_type: MfTransactionType,
    /// Units moved.
    pub units: Decimal,
    /// Fund-level amount of a buy/sell.
    pub amount_excluding_charges: Decimal,
    /// Realized gain booked by a sell or switch-out.
    pub realized_gain: Option<Decimal>,
    /// Cost basis released by a sell or switch-out, or carried in by a switch-in.
    pub cost_basis_of_units_sold: Option<Decimal>,
}

impl RecordedMfTransaction {
    fn cost_basis(&self) -> Result<Decimal, FundError> {
        self.cost_basis_of_units_sold
            .ok_or(FundError::MissingCostBasis(self.transaction_type.as_str()))
    }
}

impl FundPosition {
    /// Undoes the recorded effect of a transaction on this position.
    ///
    /// The stored cost basis and realized gain are used as-is, so the
    /// reversal does not depend on the position's current average cost.
    /// The latest NAV is kept.
    ///
    /// # Errors
    ///
    /// Returns `FundError::InsufficientUnits` when units added by the row have
    /// since left the fund, or `FundError::MissingCostBasis` for a row that
    /// needs a cost basis but has none. The position is unchanged on error.
    pub fn reverse(&mut self, recorded: &RecordedMfTransaction) -> Result<(), FundError> {
        let mut next = self.clone();
        let realized = recorded.realized_gain.unwrap_or_default();

        match recorded.transaction_type {
            MfTransactionType::Buy => {
                let amount = recorded.amount_excluding_charges;
                next.adjust_holding(-recorded.units, -amount)?;
                next.book_cash(Decimal::ZERO, -amount, -amount);
            }
            MfTransactionType::Sell => {
                let cost_basis = recorded.cost_basis()?;
                next.adjust_holding(recorded.units, cost_basis)?;
                next.book_cash(-realized, cost_basis, cost_basis);
            }
            MfTransactionType::SwitchOut => {
                let cost_basis = recorded.cost_basis()?;
                next.adjust_holding(recorded.units, cost_basis)?;
                next.book_cash(-realized, cost_basis, Decimal::ZERO);
            }
            MfTransactionType::SwitchIn => {
                let carried_in = recorded.cost_basis()?;
                next.adjust_holding(-recorded.units, -carried_in)?;
                next.book_cash(Decimal::ZERO, -carried_in, Decimal::ZERO);
            }
        }

        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fund::switch::{SwitchInput, plan_switch};
    use crate::fund::trade::{ChargeSplit, TradeInput, TradeOutcome, TradeSide};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn trade(side: TradeSide, units: Decimal, amount: Decimal, d: u32) -> TradeInput {
        TradeInput {
            side,
            units,
            charges: ChargeSplit::new(amount, dec!(2)).unwrap(),
            transaction_date: day(d),
        }
    }

    fn recorded(outcome: &TradeOutcome) -> RecordedMfTransaction {
        RecordedMfTransaction {
            transaction_type: outcome.side.into(),
            units: outcome.units,
            amount_excluding_charges: outcome.amount_excluding_charges,
            realized_gain: Some(outcome.realized_gain),
            cost_basis_of_units_sold: Some(outcome.cost_basis_of_units_sold),
        }
    }

    #[test]
    fn test_reverse_only_buy_empties_fund() {
        let mut position = FundPosition::default();
        let outcome = position
            .apply_trade(&trade(TradeSide::Buy, dec!(100), dec!(1000), 1))
            .unwrap();

        position.reverse(&recorded(&outcome)).unwrap();

        assert!(position.is_empty());
        assert_eq!(position.average_cost_per_unit, Decimal::ZERO);
        assert_eq!(position.total_invested_cash, Decimal::ZERO);
        assert_eq!(position.external_cash_invested, Decimal::ZERO);
        assert_eq!(position.current_value, Decimal::ZERO);
    }

    #[test]
    fn test_reverse_sell_restores_units_and_gain() {
        let mut position = FundPosition::default();
        position
            .apply_trade(&trade(TradeSide::Buy, dec!(100), dec!(1000), 1))
            .unwrap();
        let before = position.clone();
        let outcome = position
            .apply_trade(&trade(TradeSide::Sell, dec!(40), dec!(600), 2))
            .unwrap();
        assert_eq!(position.total_realized_gain, dec!(198));

        position.reverse(&recorded(&outcome)).unwrap();

        assert_eq!(position.total_units, before.total_units);
        assert_eq!(position.average_cost_per_unit, before.average_cost_per_unit);
        assert_eq!(position.total_realized_gain, Decimal::ZERO);
        assert_eq!(position.total_invested_cash, before.total_invested_cash);
        assert_eq!(position.external_cash_invested, before.external_cash_invested);
    }

    #[test]
    fn test_reverse_buy_after_units_sold_fails() {
        let mut position = FundPosition::default();
        let bought = position
            .apply_trade(&trade(TradeSide::Buy, dec!(10), dec!(100), 1))
            .unwrap();
        position
            .apply_trade(&trade(TradeSide::Sell, dec!(6), dec!(70), 2))
            .unwrap();
        let before = position.clone();

        let err = position.reverse(&recorded(&bought)).unwrap_err();

        assert!(matches!(err, FundError::InsufficientUnits { .. }));
        assert_eq!(position, before);
    }

    #[test]
    fn test_reverse_switch_legs() {
        let mut source = FundPosition::default();
        source
            .apply_trade(&trade(TradeSide::Buy, dec!(200), dec!(2000), 1))
            .unwrap();
        let target = FundPosition::default();
        let plan = plan_switch(
            &source,
            &target,
            &SwitchInput {
                units: dec!(100),
                source_nav: dec!(12),
                target_nav: dec!(24),
                transaction_date: day(3),
            },
        )
        .unwrap();

        let mut source_after = plan.source.clone();
        source_after
            .reverse(&RecordedMfTransaction {
                transaction_type: MfTransactionType::SwitchOut,
                units: plan.switch_out.units,
                amount_excluding_charges: plan.switch_out.total_amount,
                realized_gain: plan.switch_out.realized_gain,
                cost_basis_of_units_sold: Some(plan.switch_out.cost_basis_of_units_sold),
            })
            .unwrap();
        let mut target_after = plan.target.clone();
        target_after
            .reverse(&RecordedMfTransaction {
                transaction_type: MfTransactionType::SwitchIn,
                units: plan.switch_in.units,
                amount_excluding_charges: plan.switch_in.total_amount,
                realized_gain: None,
                cost_basis_of_units_sold: Some(plan.switch_in.cost_basis_of_units_sold),
            })
            .unwrap();

        assert_eq!(source_after.total_units, dec!(200));
        assert_eq!(source_after.average_cost_per_unit, dec!(10));
        assert_eq!(source_after.total_realized_gain, Decimal::ZERO);
        assert_eq!(source_after.total_invested_cash, dec!(2000));
        assert!(target_after.is_empty());
        assert_eq!(target_after.total_invested_cash, Decimal::ZERO);
    }

    #[test]
    fn test_reverse_legacy_sell_without_cost_basis() {
        let mut position = FundPosition::default();
        let err = position
            .reverse(&RecordedMfTransaction {
                transaction_type: MfTransactionType::Sell,
                units: dec!(1),
                amount_excluding_charges: dec!(10),
                realized_gain: None,
                cost_basis_of_units_sold: None,
            })
            .unwrap_err();

        assert_eq!(err, FundError::MissingCostBasis("sell"));
    }
}
